//! Login address validation.
//!
//! The server accepts any label; the client only lets Gmail addresses through.
use price_common::StreamError;
use regex::Regex;
use std::sync::LazyLock;

static GMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@gmail\.com$").expect("static pattern is valid")
});

/// Trims `raw` and checks it is a Gmail address.
pub fn validate_email(raw: &str) -> Result<String, StreamError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(StreamError::InvalidEmail("email is required".into()));
    }
    if !GMAIL.is_match(email) {
        return Err(StreamError::InvalidEmail(format!(
            "use a valid Gmail address (example@gmail.com), got {}",
            email
        )));
    }
    Ok(email.to_string())
}
