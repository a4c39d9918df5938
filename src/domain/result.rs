//! Result type alias using [`ProvisionError`]

use super::errors::ProvisionError;

/// Result type alias for provisioning operations
///
/// # Examples
///
/// ```
/// use zbx_provision::domain::result::Result;
/// use zbx_provision::domain::errors::ProvisionError;
///
/// fn failing_function() -> Result<()> {
///     Err(ProvisionError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ProvisionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ProvisionError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(ProvisionError::Validation("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
