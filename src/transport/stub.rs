use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::TrackerError;

use super::{ApiRequest, Transport};

/// A canned reply served by [`StubTransport`].
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// 2xx with this body.
    Body(String),
    /// Non-2xx failure with this status and body.
    Status(u16, String),
    /// 2xx echoing the request body (`null` when there is none).
    Echo,
}

/// A transport that records requests and answers from canned responses,
/// without any network access.
///
/// Responses are served in FIFO order; once the queue is empty every request
/// is answered with [`StubResponse::Echo`].
#[derive(Debug, Default)]
pub struct StubTransport {
    requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<StubResponse>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response body.
    pub fn respond_with(self, body: impl Into<String>) -> Self {
        self.push(StubResponse::Body(body.into()));
        self
    }

    /// Queue a failure with the given status.
    pub fn respond_with_status(self, status: u16, body: impl Into<String>) -> Self {
        self.push(StubResponse::Status(status, body.into()));
        self
    }

    pub fn push(&self, response: StubResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Transport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<String, TrackerError> {
        let response = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(StubResponse::Echo);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        match response {
            StubResponse::Body(body) => Ok(body),
            StubResponse::Echo => Ok(request.body.unwrap_or_else(|| "null".to_owned())),
            StubResponse::Status(status, body) => Err(TrackerError::RemoteRequest {
                method: request.method.to_string(),
                path: request.path,
                status: Some(status),
                message: body,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_queue_then_echoes() {
        let stub = StubTransport::new().respond_with(r#"{"kind":"me"}"#);

        let first = stub.send(ApiRequest::get("/me")).await.unwrap();
        assert_eq!(first, r#"{"kind":"me"}"#);

        let second = stub
            .send(ApiRequest::post("/projects/1/stories").with_body(r#"{"name":"X"}"#.into()))
            .await
            .unwrap();
        assert_eq!(second, r#"{"name":"X"}"#);
        assert_eq!(stub.requests().len(), 2);
    }

    #[tokio::test]
    async fn status_response_is_a_remote_request_error() {
        let stub = StubTransport::new().respond_with_status(404, "not found");
        let err = stub.send(ApiRequest::get("/projects/9")).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(stub.last_request().unwrap().path, "/projects/9");
    }
}
