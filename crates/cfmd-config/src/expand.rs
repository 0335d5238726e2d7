//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// Bare `$VAR` is left as is. An unset variable without a default is an
/// error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| std::env::var(var).map(Some))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_value_unchanged() {
        assert_eq!(expand_env("https://wiki.example.com", "f").unwrap(), "https://wiki.example.com");
        assert_eq!(expand_env("$NOT_BRACED", "f").unwrap(), "$NOT_BRACED");
    }

    #[test]
    fn test_expand_set_var_inside_text() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("CFMD_TEST_EXPAND_HOST", "wiki.example.com");
        }
        let result = expand_env("https://${CFMD_TEST_EXPAND_HOST}/wiki", "confluence.base_url");
        assert_eq!(result.unwrap(), "https://wiki.example.com/wiki");
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("CFMD_TEST_EXPAND_UNSET_DEFAULT");
        }
        let result = expand_env("${CFMD_TEST_EXPAND_UNSET_DEFAULT:-fallback}", "f");
        assert_eq!(result.unwrap(), "fallback");
    }

    #[test]
    fn test_unset_without_default_names_field() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::remove_var("CFMD_TEST_EXPAND_MISSING");
        }
        let err = expand_env("${CFMD_TEST_EXPAND_MISSING}", "confluence.api_token").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in confluence.api_token: ${CFMD_TEST_EXPAND_MISSING} not set"
        );
    }
}
