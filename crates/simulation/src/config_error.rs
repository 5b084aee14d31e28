// ---------------------------------------------------------------------------
// ConfigurationError: precondition violations for generation and arbitration
// ---------------------------------------------------------------------------

use std::fmt;

/// Inputs under which layout generation or spawn arbitration cannot proceed.
///
/// These are contract violations by the caller, not runtime conditions: the
/// generator aborts instead of looping because several invariants become
/// unsatisfiable by construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// No active tracks were supplied.
    EmptyTrackSet,
    /// Exactly one active track: no connection can have a distinct target.
    SingleTrack,
    /// The speed-variant set handed to the arbiter is empty.
    EmptySpeedVariants,
    /// A tunable is out of its valid range or failed to parse.
    InvalidParams(String),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::EmptyTrackSet => write!(f, "Active track set is empty"),
            ConfigurationError::SingleTrack => {
                write!(f, "Active track set has a single track; switches need two")
            }
            ConfigurationError::EmptySpeedVariants => write!(f, "Speed variant set is empty"),
            ConfigurationError::InvalidParams(msg) => write!(f, "Invalid parameters: {msg}"),
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl From<serde_json::Error> for ConfigurationError {
    fn from(e: serde_json::Error) -> Self {
        ConfigurationError::InvalidParams(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_empty_track_set() {
        let msg = format!("{}", ConfigurationError::EmptyTrackSet);
        assert!(msg.contains("empty"), "got: {msg}");
    }

    #[test]
    fn test_display_invalid_params_carries_message() {
        let err = ConfigurationError::InvalidParams("zone_count must be > 0".to_string());
        let msg = format!("{err}");
        assert!(msg.contains("zone_count"), "got: {msg}");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: ConfigurationError = json_err.into();
        assert!(matches!(err, ConfigurationError::InvalidParams(_)));
    }

    #[test]
    fn test_is_error_trait() {
        let err = ConfigurationError::SingleTrack;
        assert!(std::error::Error::source(&err).is_none());
    }
}
