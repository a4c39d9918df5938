//! CLI command implementations
//!
//! Every command returns its process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 2 | Input error (configuration, role, vendor, credentials) |
//! | 5 | Fatal error while changing the host |

use crate::domain::ProvisionError;

pub mod init;
pub mod provision;
pub mod show_config;
pub mod validate;

/// Exit code for a successful command
pub const EXIT_OK: i32 = 0;

/// Exit code for bad input
pub const EXIT_INPUT_ERROR: i32 = 2;

/// Exit code for failures while changing the host
pub const EXIT_FATAL: i32 = 5;

/// Exit code reported for a provisioning error
pub fn exit_code(err: &ProvisionError) -> i32 {
    if err.is_input_error() {
        EXIT_INPUT_ERROR
    } else {
        EXIT_FATAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code(&ProvisionError::InvalidRole {
                value: "agent".to_string()
            }),
            EXIT_INPUT_ERROR
        );
        assert_eq!(
            exit_code(&ProvisionError::ServiceFailure {
                service: "zabbix-server".to_string(),
                action: "restart".to_string(),
                reason: "exit status 1".to_string(),
            }),
            EXIT_FATAL
        );
    }
}
