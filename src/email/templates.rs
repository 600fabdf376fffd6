//! Mail bodies. Rendered by askama, so user supplied names are HTML escaped.

use askama::Template;

#[derive(Template)]
#[template(path = "email/welcome.html")]
pub struct WelcomeMail<'a> {
    pub name: &'a str,
    pub base_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/password_reset.html")]
pub struct PasswordResetMail<'a> {
    pub name: &'a str,
    pub reset_url: &'a str,
}
