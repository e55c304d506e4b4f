use http::Method;

/// A request relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, always starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// JSON-encoded body, if any.
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_method_and_path() {
        let req = ApiRequest::put("/projects/1/stories/2").with_body("[]".into());
        assert_eq!(req.method, Method::PUT);
        assert_eq!(req.path, "/projects/1/stories/2");
        assert_eq!(req.body.as_deref(), Some("[]"));
        assert!(req.query.is_empty());
    }

    #[test]
    fn query_lookup() {
        let req = ApiRequest::get("/projects/1/stories").with_query("filter", "label:bug");
        assert_eq!(req.query_value("filter"), Some("label:bug"));
        assert_eq!(req.query_value("limit"), None);
    }
}
