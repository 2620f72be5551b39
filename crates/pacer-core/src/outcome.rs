//! Call outcome descriptions handed back by the collaborating HTTP layer.
//!
//! The core never performs HTTP calls itself; the calling layer reports how
//! an attempted call ended through [`CallOutcome`], and the retry policy
//! engine classifies it. Adapters are provided for `reqwest` error and
//! response types so the HTTP layer does not hand-roll the translation.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Classified network-level failures reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkErrorKind {
    /// Connection reset by peer
    ConnectionReset,
    /// Connection refused
    ConnectionRefused,
    /// Request or connect timeout
    Timeout,
    /// DNS resolution failure
    DnsFailure,
    /// Temporary DNS failure (resolver asked us to try again)
    TemporaryDnsFailure,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkErrorKind::ConnectionReset => write!(f, "connection reset"),
            NetworkErrorKind::ConnectionRefused => write!(f, "connection refused"),
            NetworkErrorKind::Timeout => write!(f, "timeout"),
            NetworkErrorKind::DnsFailure => write!(f, "dns failure"),
            NetworkErrorKind::TemporaryDnsFailure => write!(f, "temporary dns failure"),
        }
    }
}

/// How an externally-performed HTTP call ended.
///
/// Carries whichever of the pieces the transport observed: an HTTP status,
/// a classified network error, a free-form message, and the server's
/// `Retry-After` hint when the response included one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallOutcome {
    /// HTTP status code of the response, if one was received
    pub status: Option<u16>,
    /// Classified network error, if the call failed below HTTP
    pub network_error: Option<NetworkErrorKind>,
    /// Free-form diagnostic message from the transport
    pub message: Option<String>,
    /// Server-provided retry hint parsed from response headers
    pub retry_after: Option<Duration>,
}

impl CallOutcome {
    /// Outcome for a response with the given HTTP status.
    pub fn status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Outcome for a call that failed with a network error.
    pub fn network(kind: NetworkErrorKind) -> Self {
        Self {
            network_error: Some(kind),
            ..Default::default()
        }
    }

    /// Outcome carrying only a transport diagnostic message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Attach a diagnostic message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a server retry hint.
    pub fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    /// Outcome for a received response, picking up any `Retry-After` hint.
    pub fn from_response_parts(status: u16, headers: &HeaderMap) -> Self {
        Self {
            status: Some(status),
            retry_after: crate::retry::parse_retry_after(headers),
            ..Default::default()
        }
    }

    /// True when the diagnostic message indicates a timeout.
    pub fn mentions_timeout(&self) -> bool {
        self.message
            .as_deref()
            .map(|msg| {
                let msg = msg.to_lowercase();
                msg.contains("timeout") || msg.contains("timed out")
            })
            .unwrap_or(false)
    }
}

impl From<&reqwest::Error> for CallOutcome {
    fn from(error: &reqwest::Error) -> Self {
        let message = error.to_string();
        let network_error = if error.is_timeout() {
            Some(NetworkErrorKind::Timeout)
        } else if error.is_connect() {
            if message.to_lowercase().contains("dns") {
                Some(NetworkErrorKind::DnsFailure)
            } else {
                Some(NetworkErrorKind::ConnectionRefused)
            }
        } else {
            None
        };

        Self {
            status: error.status().map(|s| s.as_u16()),
            network_error,
            message: Some(message),
            retry_after: None,
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.network_error, self.message.as_deref()) {
            (Some(status), _, Some(msg)) => write!(f, "HTTP {status}: {msg}"),
            (Some(status), _, None) => write!(f, "HTTP {status}"),
            (None, Some(kind), Some(msg)) => write!(f, "{kind}: {msg}"),
            (None, Some(kind), None) => write!(f, "{kind}"),
            (None, None, Some(msg)) => write!(f, "{msg}"),
            (None, None, None) => write!(f, "unspecified failure"),
        }
    }
}
