//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use crate::ConfigError;

/// Expand environment variable references in a configuration value.
///
/// Only the braced form is expanded; a bare `$VAR` is kept as written.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |name| std::env::var(name).map(Some))
        .map(std::borrow::Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("QUILL_TEST_BENEFIT", "Gold");
        }
        let result = expand_env("${QUILL_TEST_BENEFIT} tier", "viewer.benefit").unwrap();
        assert_eq!(result, "Gold tier");
        unsafe {
            std::env::remove_var("QUILL_TEST_BENEFIT");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUILL_TEST_UNSET");
        }
        let result = expand_env("${QUILL_TEST_UNSET:-Premium}", "viewer.benefit").unwrap();
        assert_eq!(result, "Premium");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("QUILL_TEST_MISSING");
        }
        let err = expand_env("${QUILL_TEST_MISSING}", "viewer.benefit").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("QUILL_TEST_MISSING"));
        assert!(err.to_string().contains("viewer.benefit"));
    }

    #[test]
    fn test_bare_dollar_kept() {
        assert_eq!(expand_env("$5 off", "viewer.benefit").unwrap(), "$5 off");
    }
}
