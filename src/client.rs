use serde::Serialize;
use serde::de::{DeserializeOwned, Error as _};

use crate::error::TrackerError;
use crate::filter::StoryFilter;
use crate::shape::{self, OutputShape, Shaped};
use crate::transport::{API_URL, ApiRequest, HttpTransport, Transport};
use crate::types::{Me, Membership, NewTask, Project, Story, Task};

/// Builder for [`TrackerClient`].
///
/// The API token is checked in [`build`](Self::build) and
/// [`build_with`](Self::build_with); nothing touches the network.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    api_token: Option<String>,
    project_id: String,
    shape: OutputShape,
    base_url: Option<String>,
}

impl ClientBuilder {
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = project_id.into();
        self
    }

    pub fn output_shape(mut self, shape: OutputShape) -> Self {
        self.shape = shape;
        self
    }

    /// Override the service root (defaults to [`API_URL`]).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build a client talking to the live service.
    pub fn build(self) -> Result<TrackerClient<HttpTransport>, TrackerError> {
        let token = validate_token(self.api_token.as_deref())?;
        let base_url = self.base_url.as_deref().unwrap_or(API_URL);
        let transport = HttpTransport::new(base_url, token)?;
        Ok(TrackerClient {
            project_id: self.project_id,
            shape: self.shape,
            transport,
        })
    }

    /// Build a client on top of a caller-supplied transport.
    pub fn build_with<T: Transport>(self, transport: T) -> Result<TrackerClient<T>, TrackerError> {
        validate_token(self.api_token.as_deref())?;
        Ok(TrackerClient {
            project_id: self.project_id,
            shape: self.shape,
            transport,
        })
    }
}

fn validate_token(token: Option<&str>) -> Result<&str, TrackerError> {
    match token {
        Some(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(TrackerError::Configuration("no API token provided".into())),
    }
}

/// Client for one Tracker project.
///
/// Each method issues exactly one request, except [`get_my_work`] without a
/// username, which first looks up the current user. Failures are returned
/// as-is; nothing is retried.
///
/// [`get_my_work`]: Self::get_my_work
#[derive(Debug)]
pub struct TrackerClient<T = HttpTransport> {
    project_id: String,
    shape: OutputShape,
    transport: T,
}

impl TrackerClient<HttpTransport> {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Shorthand for a live client with the default base URL.
    pub fn new(
        api_token: &str,
        project_id: impl Into<String>,
        shape: OutputShape,
    ) -> Result<Self, TrackerError> {
        Self::builder()
            .api_token(api_token)
            .project_id(project_id)
            .output_shape(shape)
            .build()
    }
}

impl<T: Transport> TrackerClient<T> {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn output_shape(&self) -> OutputShape {
        self.shape
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -----------------------------------------------------------------------
    // Stories
    // -----------------------------------------------------------------------

    /// Create a story in the context project and return the stored story.
    pub async fn add_story<S>(&self, story: &S) -> Result<Shaped<Story>, TrackerError>
    where
        S: Serialize + ?Sized,
    {
        let request =
            ApiRequest::post(format!("/projects/{}/stories", self.project_id)).with_body(encode(story)?);
        self.call(request).await
    }

    /// Replace the labels of a story.
    ///
    /// The body is the bare JSON array of label names. The current story is
    /// not read first, so the server's PUT semantics decide what happens to
    /// existing labels.
    pub async fn add_labels<S>(&self, story_id: u64, labels: &[S]) -> Result<Shaped<Story>, TrackerError>
    where
        S: AsRef<str>,
    {
        let names: Vec<&str> = labels.iter().map(AsRef::as_ref).collect();
        let request = ApiRequest::put(format!(
            "/projects/{}/stories/{story_id}",
            self.project_id
        ))
        .with_body(encode(&names)?);
        self.call(request).await
    }

    /// Stories of the context project, optionally narrowed by a search filter.
    pub async fn get_stories(&self, filter: Option<&str>) -> Result<Shaped<Vec<Story>>, TrackerError> {
        let request = with_filter(
            ApiRequest::get(format!("/projects/{}/stories", self.project_id)),
            filter,
        );
        self.call(request).await
    }

    /// Stories the given user (or, when `None`, the authenticated user) is
    /// working on.
    pub async fn get_my_work(&self, username: Option<&str>) -> Result<Shaped<Vec<Story>>, TrackerError> {
        let username = match username.filter(|u| !u.is_empty()) {
            Some(username) => username.to_owned(),
            None => {
                tracing::debug!("client: resolving username through /me");
                self.current_username().await?
            }
        };
        let filter = StoryFilter::my_work(&username).to_string();
        self.get_stories(Some(&filter)).await
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Add a task with `description` to a story.
    pub async fn add_task(&self, story_id: u64, description: &str) -> Result<Shaped<Task>, TrackerError> {
        let request = ApiRequest::post(format!(
            "/projects/{}/stories/{story_id}/tasks",
            self.project_id
        ))
        .with_body(encode(&NewTask { description })?);
        self.call(request).await
    }

    // -----------------------------------------------------------------------
    // Projects and people
    // -----------------------------------------------------------------------

    pub async fn get_memberships(
        &self,
        filter: Option<&str>,
    ) -> Result<Shaped<Vec<Membership>>, TrackerError> {
        let request = with_filter(
            ApiRequest::get(format!("/projects/{}/memberships", self.project_id)),
            filter,
        );
        self.call(request).await
    }

    /// Projects visible to the authenticated user.
    pub async fn get_projects(&self) -> Result<Shaped<Vec<Project>>, TrackerError> {
        self.call(ApiRequest::get("/projects")).await
    }

    /// The authenticated user.
    pub async fn get_me(&self) -> Result<Shaped<Me>, TrackerError> {
        self.call(ApiRequest::get("/me")).await
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<Shaped<R>, TrackerError> {
        let body = self.transport.send(request).await?;
        shape::decode(self.shape, &body)
    }

    async fn current_username(&self) -> Result<String, TrackerError> {
        let me = match self.get_me().await {
            Ok(Shaped::Struct(me)) => me,
            Ok(Shaped::Map(value)) => serde_json::from_value(value).map_err(TrackerError::Decode)?,
            Err(err) => return Err(identity_rejection(&err).unwrap_or(err)),
        };

        if me.is_error() {
            return Err(auth_error(me));
        }

        me.username
            .ok_or_else(|| TrackerError::Decode(serde_json::Error::missing_field("username")))
    }
}

/// Tracker answers a rejected token on `/me` with a non-2xx status and an
/// error payload; surface that as an authentication failure.
fn identity_rejection(err: &TrackerError) -> Option<TrackerError> {
    let TrackerError::RemoteRequest { message, .. } = err else {
        return None;
    };
    serde_json::from_str::<Me>(message)
        .ok()
        .filter(Me::is_error)
        .map(auth_error)
}

fn auth_error(me: Me) -> TrackerError {
    let message = me.error.unwrap_or_else(|| "unknown error".to_owned());
    tracing::warn!("client: identity lookup rejected: {message}");
    TrackerError::RemoteAuth(message)
}

fn encode<S: Serialize + ?Sized>(payload: &S) -> Result<String, TrackerError> {
    serde_json::to_string(payload).map_err(TrackerError::Encode)
}

/// Attach `filter` as a query parameter; absent or empty filters are omitted.
fn with_filter(request: ApiRequest, filter: Option<&str>) -> ApiRequest {
    match filter {
        Some(filter) if !filter.is_empty() => request.with_query("filter", filter),
        _ => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::StubTransport;

    fn stub_client(stub: StubTransport) -> TrackerClient<StubTransport> {
        TrackerClient::builder()
            .api_token("secret")
            .project_id("99")
            .build_with(stub)
            .unwrap()
    }

    #[test]
    fn whitespace_token_is_rejected() {
        let err = TrackerClient::builder()
            .api_token("   ")
            .project_id("99")
            .build()
            .unwrap_err();
        assert!(matches!(err, TrackerError::Configuration(_)));
    }

    #[test]
    fn builder_defaults_to_struct_shape() {
        let client = stub_client(StubTransport::new());
        assert_eq!(client.output_shape(), OutputShape::Struct);
        assert_eq!(client.project_id(), "99");
    }

    #[test]
    fn empty_filter_is_omitted() {
        let req = with_filter(ApiRequest::get("/projects/1/stories"), Some(""));
        assert!(req.query.is_empty());
    }

    #[tokio::test]
    async fn missing_username_is_a_decode_error() {
        let client = stub_client(StubTransport::new().respond_with(r#"{"kind":"me","id":3}"#));
        let err = client.get_my_work(None).await.unwrap_err();
        assert!(matches!(err, TrackerError::Decode(_)));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn error_without_message_still_fails_auth() {
        let client = stub_client(StubTransport::new().respond_with(r#"{"kind":"error"}"#));
        let err = client.get_my_work(None).await.unwrap_err();
        assert!(matches!(err, TrackerError::RemoteAuth(ref m) if m == "unknown error"));
    }

    #[tokio::test]
    async fn rejected_identity_status_becomes_auth_error() {
        let client = stub_client(
            StubTransport::new().respond_with_status(403, r#"{"kind":"error","error":"bad token"}"#),
        );
        let err = client.get_my_work(None).await.unwrap_err();
        assert!(matches!(err, TrackerError::RemoteAuth(ref m) if m == "bad token"));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn identity_failure_without_error_payload_stays_remote_request() {
        let client = stub_client(StubTransport::new().respond_with_status(502, "Bad Gateway"));
        let err = client.get_my_work(None).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[tokio::test]
    async fn empty_username_falls_back_to_identity_lookup() {
        let client = stub_client(
            StubTransport::new()
                .respond_with(r#"{"kind":"me","username":"carol"}"#)
                .respond_with("[]"),
        );
        client.get_my_work(Some("")).await.unwrap();
        let requests = client.transport().requests();
        assert_eq!(requests[0].path, "/me");
        assert_eq!(requests[1].query_value("filter"), Some("mywork:carol"));
    }
}
