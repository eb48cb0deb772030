//! Error types for configuration loading and validation.

/// Errors raised while loading or validating scan and deployment configuration.
///
/// # Examples
///
/// ```rust
/// use activityscan::{ConfigError, ScanConfigBuilder};
///
/// let err = ScanConfigBuilder::new().min_window(0).build().validate().unwrap_err();
/// assert!(matches!(err, ConfigError::OutOfRange { .. }));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A string that should hold an address is malformed.
    #[error("Invalid address for {field}: {value}")]
    InvalidAddress {
        /// Which setting held the address
        field: &'static str,
        /// The offending input
        value: String,
    },

    /// A numeric setting is outside the range the scanner can work with.
    #[error("Setting {field} out of range: {reason}")]
    OutOfRange {
        /// Name of the setting
        field: &'static str,
        /// Why the value is rejected
        reason: String,
    },

    /// Deployment JSON could not be parsed.
    #[error("Failed to parse deployment config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create an `OutOfRange` error for a setting.
    pub fn out_of_range(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::OutOfRange {
            field,
            reason: reason.into(),
        }
    }
}
