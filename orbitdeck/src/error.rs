//! Error taxonomy for the control panel.
//!
//! Each component has its own error enum; every one of them maps onto an
//! [`ErrorKind`] so the host can decide how to surface it (install prompt,
//! silent reset, warning banner, inline form error) without matching on
//! component-specific variants.

use std::fmt;

/// Classification of a component failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No wallet provider is installed. Needs user action before retrying.
    ProviderUnavailable,
    /// The user declined a wallet request.
    ProviderRejected,
    /// A fetch failed at the transport level or returned a non-success status.
    NetworkTransport,
    /// A response arrived but did not have an expected shape.
    MalformedResponse,
    /// The wallet is connected to a network outside the supported catalog.
    UnsupportedChain,
    /// User input failed local validation; nothing was sent.
    Validation,
    /// The remote service received the request and refused it.
    RemoteRejected,
}

impl ErrorKind {
    /// Returns `true` if the same call may succeed later without user action.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::NetworkTransport | Self::MalformedResponse)
    }

    /// Returns `true` if the failure should be surfaced without noise.
    ///
    /// A user declining a wallet prompt is an ordinary outcome, not a warning.
    #[must_use]
    pub const fn is_silent(self) -> bool {
        matches!(self, Self::ProviderRejected)
    }

    /// Stable machine-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "provider_unavailable",
            Self::ProviderRejected => "provider_rejected",
            Self::NetworkTransport => "network_transport",
            Self::MalformedResponse => "malformed_response",
            Self::UnsupportedChain => "unsupported_chain",
            Self::Validation => "validation",
            Self::RemoteRejected => "remote_rejected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rejection_is_silent() {
        assert!(ErrorKind::ProviderRejected.is_silent());
        assert!(!ErrorKind::ProviderUnavailable.is_silent());
        assert!(!ErrorKind::NetworkTransport.is_silent());
    }

    #[test]
    fn test_transient_kinds() {
        assert!(ErrorKind::NetworkTransport.is_transient());
        assert!(ErrorKind::MalformedResponse.is_transient());
        assert!(!ErrorKind::Validation.is_transient());
        assert!(!ErrorKind::ProviderUnavailable.is_transient());
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(ErrorKind::UnsupportedChain.to_string(), "unsupported_chain");
    }
}
