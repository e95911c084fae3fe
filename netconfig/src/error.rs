use netconfig_data::DataError;
use std::path::PathBuf;
use thiserror::Error;

/// All errors generated in `netconfig`.
#[derive(Debug, Error)]
pub enum NetconfigError {
    #[error("configuration file '{}' not found", .0.display())]
    ConfigMissing(PathBuf),

    #[error("failed to load configuration '{}': {reason}", .path.display())]
    ConfigCorrupt { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("interface {0} not found or unavailable")]
    NoData(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("data provider error: {0}")]
    Data(#[from] DataError),
}

impl NetconfigError {
    /// Startup failures terminate the process; everything else is reported and the session
    /// continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NetconfigError::ConfigMissing(_) | NetconfigError::ConfigCorrupt { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, NetconfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netconfig_error_is_fatal() {
        struct TestCase {
            input: NetconfigError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: missing file aborts startup
                input: NetconfigError::ConfigMissing(PathBuf::from("network_interfaces.json")),
                expected: true,
            },
            TestCase {
                // TC1: unreadable JSON aborts startup
                input: NetconfigError::ConfigCorrupt {
                    path: PathBuf::from("network_interfaces.json"),
                    reason: "expected value at line 1 column 1".to_string(),
                },
                expected: true,
            },
            TestCase {
                // TC2: single entity without data is skipped
                input: NetconfigError::NoData("eth0_005930".to_string()),
                expected: false,
            },
            TestCase {
                // TC3: bad menu entry re-prompts
                input: NetconfigError::InvalidInput("abc".to_string()),
                expected: false,
            },
            TestCase {
                // TC4: failed save is reported
                input: NetconfigError::from(std::io::Error::other("disk full")),
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_fatal();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_config_missing_message() {
        let error = NetconfigError::ConfigMissing(PathBuf::from("network_interfaces.json"));
        assert_eq!(
            error.to_string(),
            "configuration file 'network_interfaces.json' not found"
        );
    }
}
