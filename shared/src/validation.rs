//! Input validation functions
//!
//! Plain checks return `Result<(), String>`. The `*_field` adapters wrap
//! them for `#[validate(custom(function = ...))]` on request types.

use std::borrow::Cow;
use validator::ValidationError;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    let email_regex = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map_err(|e| format!("Email pattern failed to compile: {}", e))?;
    if !email_regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

// ============================================================================
// CPF
// ============================================================================

/// Strip punctuation from a CPF (`123.456.789-09` -> `12345678909`)
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a CPF, formatted or not, including both check digits
pub fn validate_cpf(cpf: &str) -> Result<(), String> {
    let digits: Vec<u32> = normalize_cpf(cpf)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return Err("CPF must have 11 digits".to_string());
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return Err("Invalid CPF".to_string());
    }
    if cpf_check_digit(&digits[..9]) != digits[9] || cpf_check_digit(&digits[..10]) != digits[10] {
        return Err("Invalid CPF".to_string());
    }
    Ok(())
}

/// Mod-11 check digit over `digits`, weights counting down to 2
fn cpf_check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

// ============================================================================
// Contact Data
// ============================================================================

/// Brazilian phone number: 10 or 11 digits once punctuation is removed
pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.trim().is_empty() {
        return Err("Phone cannot be empty".to_string());
    }
    if phone
        .chars()
        .any(|c| !(c.is_ascii_digit() || " ()-+".contains(c)))
    {
        return Err("Phone contains invalid characters".to_string());
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=11).contains(&digits) {
        return Err("Phone must have 10 or 11 digits".to_string());
    }
    Ok(())
}

/// Every entry must be an absolute http(s) URL
pub fn validate_url_list(urls: &[String]) -> Result<(), String> {
    for url in urls {
        let trimmed = url.trim();
        let has_scheme = trimmed.starts_with("https://") || trimmed.starts_with("http://");
        if !has_scheme || trimmed.contains(char::is_whitespace) {
            return Err(format!("Invalid URL: {}", url));
        }
    }
    Ok(())
}

/// Validate a date of birth against today: not in the future, at most 120 years ago
pub fn validate_birth_date(
    birth_date: chrono::NaiveDate,
    today: chrono::NaiveDate,
) -> Result<(), String> {
    if birth_date > today {
        return Err("Birth date cannot be in the future".to_string());
    }
    match today.years_since(birth_date) {
        Some(age) if age > 120 => Err("Birth date is too far in the past".to_string()),
        Some(_) => Ok(()),
        None => Err("Invalid birth date".to_string()),
    }
}

// ============================================================================
// validator adapters
// ============================================================================

fn to_validation_error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message));
    error
}

pub fn validate_cpf_field(cpf: &str) -> Result<(), ValidationError> {
    validate_cpf(cpf).map_err(|m| to_validation_error("cpf", m))
}

pub fn validate_phone_field(phone: &str) -> Result<(), ValidationError> {
    validate_phone(phone).map_err(|m| to_validation_error("phone", m))
}

pub fn validate_url_list_field(urls: &[String]) -> Result<(), ValidationError> {
    validate_url_list(urls).map_err(|m| to_validation_error("url", m))
}
