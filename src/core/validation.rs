use chrono::NaiveDate;
use unicode_segmentation::UnicodeSegmentation;

const MAX_NAME_GRAPHEMES: usize = 256;

/// Birthdates are entered as `YYYY-MM-DD`; anything else is rejected before
/// it reaches the database.
pub fn validate_date(date: &str) -> bool {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

pub fn validate_email(email: &str) -> bool {
    validator::validate_email(email)
}

/// Names must be non-empty, alphabetic and of sane length. The alphabetic
/// check runs per character so accented names pass.
pub fn validate_name(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.graphemes(true).count() > MAX_NAME_GRAPHEMES {
        return false;
    }
    trimmed.chars().all(|c| c.is_alphabetic())
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, stored_hash)
}
