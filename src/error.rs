use thiserror::Error;

/// Errors surfaced by the Tracker client.
///
/// Nothing is retried or recovered locally: every variant reaches the caller
/// as soon as it happens.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The client could not be built (missing or empty API token).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network failure or non-2xx response for a request.
    #[error("{method} {path} failed{}: {message}", status_suffix(.status))]
    RemoteRequest {
        method: String,
        path: String,
        status: Option<u16>,
        message: String,
    },

    /// The identity lookup answered with an `error` kind.
    #[error("authentication rejected by Tracker: {0}")]
    RemoteAuth(String),

    #[error("decoding response body")]
    Decode(#[source] serde_json::Error),

    #[error("encoding request payload")]
    Encode(#[source] serde_json::Error),
}

impl TrackerError {
    /// HTTP status of a failed request, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRequest { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_request_display_includes_status() {
        let err = TrackerError::RemoteRequest {
            method: "GET".into(),
            path: "/me".into(),
            status: Some(403),
            message: "forbidden".into(),
        };
        assert_eq!(err.to_string(), "GET /me failed with status 403: forbidden");
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn remote_request_display_without_status() {
        let err = TrackerError::RemoteRequest {
            method: "POST".into(),
            path: "/projects/1/stories".into(),
            status: None,
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "POST /projects/1/stories failed: connection refused"
        );
        assert_eq!(err.status(), None);
    }

    #[test]
    fn remote_auth_carries_server_message() {
        let err = TrackerError::RemoteAuth("not authorized".into());
        assert!(err.to_string().contains("not authorized"));
    }
}
