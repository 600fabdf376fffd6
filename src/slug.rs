//! URL slugs for gyms.
//!
//! A slug is derived from the gym name. When other gyms already use the same
//! base (`gym`, `gym-2`, `gym-3`, ...) a numeric suffix is appended. The check
//! and the later insert are not atomic; the unique index on `gyms.slug`
//! catches the rare collision.

const FALLBACK: &str = "gym";

pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' || c == '/' || c == '.' {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        FALLBACK.to_string()
    } else {
        slug
    }
}

/// Postgres regex matching `base` and `base-<n>`. The base only ever holds
/// `[a-z0-9-]`, so it needs no escaping.
pub fn family_pattern(base: &str) -> String {
    format!("^({base})((-[0-9]*$)?)$")
}

/// Pick a slug given the slugs already in `base`'s family.
pub fn disambiguate(base: &str, existing: &[String]) -> String {
    if existing.is_empty() {
        return base.to_string();
    }

    let mut n = existing.len() + 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !existing.iter().any(|s| s.eq_ignore_ascii_case(&candidate)) {
            return candidate;
        }
        n += 1;
    }
}
