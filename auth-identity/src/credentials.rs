use std::collections::HashMap;

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Read-only view of an inbound request, as much of it as authentication
/// needs.
pub trait AuthRequest: Send + Sync {
    /// Header value by name. Implementations should match names
    /// case-insensitively, as HTTP does.
    fn header(&self, name: &str) -> Option<&str>;

    fn cookie(&self, name: &str) -> Option<&str>;

    /// Form field by name, for login requests.
    fn form_field(&self, _name: &str) -> Option<&str> {
        None
    }
}

/// Value of the `Authorization` header, verbatim.
pub fn authorization_header(request: Option<&dyn AuthRequest>) -> Option<String> {
    request?.header(AUTHORIZATION_HEADER).map(str::to_string)
}

/// Value of the session cookie named `session_name`.
pub fn session_cookie(request: Option<&dyn AuthRequest>, session_name: Option<&str>) -> Option<String> {
    let request = request?;
    let name = session_name.filter(|name| !name.is_empty())?;
    request.cookie(name).map(str::to_string)
}

/// Plain owned request, for callers outside an HTTP stack and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticRequest {
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    form: HashMap<String, String>,
}

impl StaticRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }
}

impl AuthRequest for StaticRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn form_field(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }
}
