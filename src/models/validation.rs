use std::collections::HashMap;

/// Field name to message, reported as 422 `field_errors`.
pub type FieldErrors = HashMap<String, String>;

/// Check a required string field with a maximum length.
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    max_len: usize,
    required_message: &str,
    label: &str,
) {
    match value.map(str::trim) {
        None | Some("") => {
            errors.insert(field.to_string(), required_message.to_string());
        }
        Some(v) if v.chars().count() > max_len => {
            errors.insert(
                field.to_string(),
                format!("Maximum length for the {} is {} characters.", label, max_len),
            );
        }
        Some(_) => {}
    }
}

pub fn into_result(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_overlong_values_are_reported() {
        let mut errors = FieldErrors::new();
        required_text(&mut errors, "name", Some("  "), 5, "Name is required.", "Name");
        required_text(&mut errors, "city", Some("Amsterdam"), 5, "City is required.", "City");
        required_text(&mut errors, "ok", Some("fine"), 5, "x", "Ok");
        assert_eq!(errors["name"], "Name is required.");
        assert_eq!(errors["city"], "Maximum length for the City is 5 characters.");
        assert!(!errors.contains_key("ok"));
        assert!(into_result(errors).is_err());
    }
}
