use crate::error::{BomDiffError, BomDiffResult};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub fn validate_model<T: Validate>(model: &T) -> BomDiffResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(BomDiffError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.join(", ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(message) => format!("{}: {}", path, message),
                        None => match error.code.as_ref() {
                            "length" => format!("Length validation failed for field '{}'", path),
                            "range" => format!("Value out of range for field '{}'", path),
                            "required" => format!("Field '{}' is required", path),
                            code => format!("Validation failed for field '{}': {}", path, code),
                        },
                    };
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, messages),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, messages);
                }
            }
        }
    }
}

/// Extension of a document name, lowercased and without the dot
pub fn file_extension(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn validate_file_type(file_name: &str, allowed_types: &[&str]) -> BomDiffResult<()> {
    let extension = file_extension(file_name);

    if !allowed_types.contains(&extension.as_str()) {
        return Err(BomDiffError::unsupported_format(file_name, extension));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> BomDiffResult<()> {
    if file_size > max_size {
        return Err(BomDiffError::validation(
            "file_size",
            format!("File size {} bytes exceeds maximum allowed size {} bytes", file_size, max_size),
        ));
    }

    Ok(())
}

pub fn validate_target_count(count: usize, max_targets: usize) -> BomDiffResult<()> {
    if count == 0 {
        return Err(BomDiffError::validation(
            "targets",
            "At least one target BOM is required",
        ));
    }

    if count > max_targets {
        return Err(BomDiffError::validation(
            "targets",
            format!("{} target BOMs given, at most {} allowed", count, max_targets),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_validate_file_type() {
        let allowed_types = &["csv", "xlsx", "pdf"];
        assert!(validate_file_type("master.XLSX", allowed_types).is_ok());

        let err = validate_file_type("notes.xyz", allowed_types).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }

    #[test]
    fn test_validate_file_size() {
        assert!(validate_file_size(10, 10).is_ok());
        assert!(validate_file_size(11, 10).is_err());
    }

    #[test]
    fn test_validate_target_count() {
        assert!(validate_target_count(1, 5).is_ok());
        assert!(validate_target_count(5, 5).is_ok());
        assert!(validate_target_count(0, 5).is_err());
        assert!(validate_target_count(6, 5).is_err());
    }

    #[test]
    fn test_nested_config_errors_are_reported_with_path() {
        let mut config = AppConfig::default();
        config.comparison.max_targets = 0;

        let err = validate_model(&config).unwrap_err();
        match err {
            BomDiffError::Validation { message, .. } => {
                assert!(message.contains("comparison.max_targets"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
