//! Ordered validation of identity payloads.

use serde_json::Value;

use crate::config::ValidationConfig;
use crate::validation::fields::{validate_full_name, validate_phone, validate_secret, ValidationError};

pub const FULL_NAME_FIELD: &str = "full_name";
pub const SECRET_FIELD: &str = "password";
pub const PHONE_FIELD: &str = "phone";

/// Runs name, secret, then phone checks and stops at the first failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidationPipeline {
    strict: bool,
}

impl ValidationPipeline {
    /// Create a new pipeline from validation settings.
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            strict: config.strict,
        }
    }

    /// Validate a decoded payload. Missing or non-string fields count as empty.
    pub fn validate(&self, payload: &Value) -> Result<(), ValidationError> {
        let field = |name: &str| payload.get(name).and_then(Value::as_str).unwrap_or("");

        validate_full_name(field(FULL_NAME_FIELD))?;
        self.apply(validate_secret(field(SECRET_FIELD)))?;
        self.apply(validate_phone(field(PHONE_FIELD)))?;
        Ok(())
    }

    /// Lenient mode downgrades format-rule failures to a warning.
    fn apply(&self, result: Result<(), ValidationError>) -> Result<(), ValidationError> {
        match result {
            Err(e) if !self.strict && e.is_format_rule() => {
                tracing::warn!(field = e.field(), reason = %e, "Format rule failed (lenient mode)");
                Ok(())
            }
            other => other,
        }
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strict() -> ValidationPipeline {
        ValidationPipeline::default()
    }

    fn lenient() -> ValidationPipeline {
        ValidationPipeline::new(ValidationConfig { strict: false })
    }

    #[test]
    fn test_valid_payload() {
        let payload = json!({"full_name": "Ann Lee", "password": "Secur3Pass", "phone": "+998901234567"});
        assert_eq!(strict().validate(&payload), Ok(()));
    }

    #[test]
    fn test_short_circuits_in_order() {
        let all_bad = json!({"full_name": "Ann", "password": "x", "phone": "123"});
        assert_eq!(strict().validate(&all_bad), Err(ValidationError::InvalidName));

        let bad_secret_and_phone = json!({"full_name": "Ann Lee", "password": "x", "phone": "123"});
        assert_eq!(strict().validate(&bad_secret_and_phone), Err(ValidationError::WeakSecret));
    }

    #[test]
    fn test_missing_fields_are_empty() {
        assert_eq!(strict().validate(&json!({})), Err(ValidationError::InvalidName));
        assert_eq!(
            strict().validate(&json!({"full_name": "Ann Lee"})),
            Err(ValidationError::WeakSecret)
        );
        assert_eq!(
            strict().validate(&json!({"full_name": "Ann Lee", "password": 12345678})),
            Err(ValidationError::WeakSecret)
        );
    }

    #[test]
    fn test_strict_rejects_bad_phone() {
        let payload = json!({"full_name": "Ann Lee", "password": "Secur3Pass", "phone": "+1 555 0100"});
        assert_eq!(strict().validate(&payload), Err(ValidationError::InvalidPhone));
    }

    #[test]
    fn test_lenient_only_relaxes_format_rules() {
        let bad_phone = json!({"full_name": "Ann Lee", "password": "Secur3Pass", "phone": "+1 555 0100"});
        assert_eq!(lenient().validate(&bad_phone), Ok(()));

        let bad_charset = json!({"full_name": "Ann Lee", "password": "Secur3 Pass", "phone": "+998901234567"});
        assert_eq!(lenient().validate(&bad_charset), Ok(()));

        let short = json!({"full_name": "Ann Lee", "password": "short", "phone": "+998901234567"});
        assert_eq!(lenient().validate(&short), Err(ValidationError::WeakSecret));
    }
}
