// transport module: the HTTP seam the client is built on

mod live;
mod request;
pub mod stub;

use std::future::Future;

use crate::error::TrackerError;

pub use live::{API_URL, HttpTransport, TOKEN_HEADER};
pub use request::ApiRequest;
pub use stub::StubTransport;

/// Performs one HTTP exchange and hands back the raw response body.
///
/// Implemented by `HttpTransport` for the live service and by `StubTransport`
/// for tests. Implementations map network failures and non-2xx statuses to
/// `TrackerError::RemoteRequest`.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<String, TrackerError>> + Send;
}
