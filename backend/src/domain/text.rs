//! Helpers for validating free-text request fields.

use super::Error;

/// Trim `raw` and require it to be non-empty and at most `max` characters.
///
/// Failures become field-level [`Error`]s naming `field`.
///
/// # Examples
/// ```
/// use backend::domain::required_text;
///
/// assert_eq!(required_text("  Leak ", "title", 100).unwrap(), "Leak");
/// assert!(required_text(" ", "title", 100).is_err());
/// ```
pub fn required_text(raw: &str, field: &str, max: usize) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_field(
            field,
            "empty_value",
            format!("{field} must not be empty"),
        ));
    }
    ensure_max_chars(trimmed, field, max)?;
    Ok(trimmed.to_owned())
}

/// Trim optional text, mapping blank input to `None`.
pub fn optional_text(raw: Option<&str>, field: &str, max: usize) -> Result<Option<String>, Error> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => {
            ensure_max_chars(value, field, max)?;
            Ok(Some(value.to_owned()))
        }
    }
}

fn ensure_max_chars(value: &str, field: &str, max: usize) -> Result<(), Error> {
    if value.chars().count() > max {
        return Err(Error::invalid_field(
            field,
            "too_long",
            format!("{field} must be at most {max} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn counts_characters_not_bytes() {
        assert!(required_text("ñññ", "title", 3).is_ok());
        assert!(required_text("ññññ", "title", 3).is_err());
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("   "), None)]
    #[case(Some(" hi "), Some("hi"))]
    fn optional_text_normalises_blank(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let value = optional_text(raw, "comment", 10).expect("valid");
        assert_eq!(value.as_deref(), expected);
    }

    #[rstest]
    fn errors_name_the_field() {
        let error = required_text("", "content", 10).expect_err("blank");
        assert_eq!(
            error.details(),
            Some(&serde_json::json!({ "field": "content", "code": "empty_value" }))
        );
    }
}
