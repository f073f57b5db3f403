//! Error types for frame decoding and rule token parsing.

/// Errors raised while decoding a raw frame.
///
/// The dispatch path never propagates these: an undecodable frame is ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("{layer} header too short: need {min} bytes, got {actual}")]
    TooShort {
        layer: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("unsupported IP version: {0}")]
    UnsupportedIpVersion(u8),

    #[error("invalid IPv4 header length: {0} words")]
    InvalidIhl(u8),
}

/// Errors raised while turning rule-set tokens into typed rule fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("expected 7 rule fields, got {0}")]
    WrongFieldCount(usize),

    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),

    #[error("invalid ingress port: {0}")]
    InvalidIngressPort(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::TooShort {
            layer: "ethernet",
            min: 14,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "ethernet header too short: need 14 bytes, got 3"
        );

        let err = FrameError::UnsupportedIpVersion(6);
        assert_eq!(err.to_string(), "unsupported IP version: 6");

        let err = FrameError::InvalidIhl(3);
        assert_eq!(err.to_string(), "invalid IPv4 header length: 3 words");
    }

    #[test]
    fn test_rule_error_display() {
        let err = RuleError::WrongFieldCount(6);
        assert_eq!(err.to_string(), "expected 7 rule fields, got 6");

        let err = RuleError::UnknownProtocol("tcp".to_string());
        assert_eq!(err.to_string(), "unknown protocol: tcp");

        let err = RuleError::UnknownAction("deny".to_string());
        assert_eq!(err.to_string(), "unknown action: deny");

        let err = RuleError::InvalidPort("http".to_string());
        assert_eq!(err.to_string(), "invalid port: http");

        let err = RuleError::InvalidIngressPort("eth0".to_string());
        assert_eq!(err.to_string(), "invalid ingress port: eth0");
    }
}
