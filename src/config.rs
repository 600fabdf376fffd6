use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub upload_dir: PathBuf,
    pub max_body_size: usize,
    pub secure_cookies: bool,
    pub log_level: String,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let session_secret = env_required("SESSION_SECRET")?;

        if session_secret.len() < 32 {
            return Err("SESSION_SECRET must be at least 32 characters".to_string());
        }

        let host: IpAddr = env_or("GYMS_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid GYMS_HOST: {e}"))?;

        let port: u16 = env_or("GYMS_PORT", "7777")
            .parse()
            .map_err(|e| format!("Invalid GYMS_PORT: {e}"))?;

        let base_url = env_or("GYMS_BASE_URL", &format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let upload_dir = PathBuf::from(env_or("GYMS_UPLOAD_DIR", "public/uploads"));

        let max_body_size: usize = env_or("GYMS_MAX_BODY_SIZE", "10485760")
            .parse()
            .map_err(|e| format!("Invalid GYMS_MAX_BODY_SIZE: {e}"))?;

        let secure_cookies = match env_or("GYMS_SECURE_COOKIES", "true").as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            other => return Err(format!("Invalid GYMS_SECURE_COOKIES: {other}")),
        };

        let log_level = env_or("GYMS_LOG_LEVEL", "info");

        let smtp = match (
            std::env::var("GYMS_SMTP_HOST").ok(),
            std::env::var("GYMS_SMTP_PORT").ok(),
            std::env::var("GYMS_SMTP_USER").ok(),
            std::env::var("GYMS_SMTP_PASS").ok(),
            std::env::var("GYMS_SMTP_FROM").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass), Some(from)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid GYMS_SMTP_PORT: {e}"))?,
                user,
                pass,
                from,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            session_secret,
            host,
            port,
            base_url,
            upload_dir,
            max_body_size,
            secure_cookies,
            log_level,
            smtp,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
