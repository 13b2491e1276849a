//! Field validators shared by the API and the web forms.
//!
//! Each validator returns the normalized value, or a message suitable for
//! showing next to the offending field.

use chrono::NaiveDate;

pub const NAME_MAX: usize = 100;
pub const TITLE_MAX: usize = 200;

/// A business code: exactly `len` ASCII letters or digits, stored upper-case.
pub fn code(value: &str, len: usize) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("This field is required.".to_string());
    }
    if value.chars().count() != len {
        return Err(format!("Must be exactly {} characters.", len));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Only letters and digits are allowed.".to_string());
    }
    Ok(value.to_ascii_uppercase())
}

/// Required free text, trimmed, at most `max` characters.
pub fn required_text(value: &str, max: usize) -> Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("This field is required.".to_string());
    }
    if value.chars().count() > max {
        return Err(format!("Ensure this field has no more than {} characters.", max));
    }
    Ok(value.to_string())
}

/// Optional free text; blank input becomes `None`.
pub fn optional_text(value: Option<&str>, max: usize) -> Result<Option<String>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max => Err(format!(
            "Ensure this field has no more than {} characters.",
            max
        )),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// ISBN-10 or ISBN-13, hyphens allowed. Only the digit count and alphabet are
/// checked, not the check digit.
pub fn isbn(value: Option<&str>) -> Result<Option<String>, String> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    let compact: String = raw.chars().filter(|c| *c != '-').collect();
    if !compact.is_ascii() {
        return Err("Enter a valid ISBN-10 or ISBN-13.".to_string());
    }
    let (body, last) = compact.split_at(compact.len().saturating_sub(1));
    let digits_ok = body.chars().all(|c| c.is_ascii_digit())
        && last
            .chars()
            .all(|c| c.is_ascii_digit() || (compact.len() == 10 && c.eq_ignore_ascii_case(&'x')));

    if !digits_ok || !(compact.len() == 10 || compact.len() == 13) {
        return Err("Enter a valid ISBN-10 or ISBN-13.".to_string());
    }
    Ok(Some(raw.to_ascii_uppercase()))
}

/// Optional calendar date in `YYYY-MM-DD` form.
pub fn optional_date(value: Option<&str>) -> Result<Option<String>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(|d| Some(d.format("%Y-%m-%d").to_string()))
            .map_err(|_| "Enter a valid date (YYYY-MM-DD).".to_string()),
    }
}

pub fn username(value: &str) -> Result<String, String> {
    let value = value.trim();
    let len = value.chars().count();
    if !(3..=30).contains(&len) {
        return Err("Must be between 3 and 30 characters.".to_string());
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "_.@+-".contains(c))
    {
        return Err("Letters, digits and _ . @ + - only.".to_string());
    }
    Ok(value.to_string())
}

pub fn password(value: &str) -> Result<(), String> {
    if value.chars().count() < 8 {
        return Err("Must be at least 8 characters.".to_string());
    }
    Ok(())
}

pub fn role(value: &str) -> Result<String, String> {
    match value {
        "admin" | "user" => Ok(value.to_string()),
        _ => Err("Must be either \"admin\" or \"user\".".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_rules() {
        assert_eq!(code("a1b", 3), Ok("A1B".to_string()));
        assert_eq!(code(" 07 ", 2), Ok("07".to_string()));
        assert!(code("", 3).is_err());
        assert!(code("AB", 3).is_err());
        assert!(code("ABCD", 3).is_err());
        assert!(code("A-B", 3).is_err());
        assert!(code("ÄBC", 3).is_err());
    }

    #[test]
    fn test_text_rules() {
        assert_eq!(required_text("  Fiction ", NAME_MAX), Ok("Fiction".to_string()));
        assert!(required_text("   ", NAME_MAX).is_err());
        assert!(required_text(&"x".repeat(NAME_MAX + 1), NAME_MAX).is_err());

        assert_eq!(optional_text(Some("  "), NAME_MAX), Ok(None));
        assert_eq!(optional_text(None, NAME_MAX), Ok(None));
        assert_eq!(optional_text(Some("Ace"), NAME_MAX), Ok(Some("Ace".to_string())));
    }

    #[test]
    fn test_isbn_rules() {
        assert_eq!(
            isbn(Some("978-0441172719")),
            Ok(Some("978-0441172719".to_string()))
        );
        assert_eq!(isbn(Some("044117271x")), Ok(Some("044117271X".to_string())));
        assert_eq!(isbn(Some("")), Ok(None));
        assert!(isbn(Some("12345")).is_err());
        assert!(isbn(Some("978044117271X")).is_err());
        assert!(isbn(Some("abcdefghij")).is_err());
    }

    #[test]
    fn test_date_rules() {
        assert_eq!(
            optional_date(Some("2024-02-29")),
            Ok(Some("2024-02-29".to_string()))
        );
        assert!(optional_date(Some("2023-02-29")).is_err());
        assert!(optional_date(Some("29/02/2024")).is_err());
        assert_eq!(optional_date(None), Ok(None));
    }

    #[test]
    fn test_user_rules() {
        assert!(username("ab").is_err());
        assert!(username("has space").is_err());
        assert_eq!(username("librarian.01"), Ok("librarian.01".to_string()));
        assert!(password("short").is_err());
        assert!(password("long enough").is_ok());
        assert!(role("owner").is_err());
    }
}
