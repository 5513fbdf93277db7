use auth_identity::AuthRequest;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use std::collections::HashMap;

/// Owned snapshot of the parts of an HTTP request that authentication reads.
#[derive(Debug, Clone, Default)]
pub struct RequestView {
    headers: HeaderMap,
    cookies: CookieJar,
    form: HashMap<String, String>,
}

impl RequestView {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            headers: headers.clone(),
            cookies: CookieJar::from_headers(headers),
            form: HashMap::new(),
        }
    }

    pub fn with_form(mut self, form: HashMap<String, String>) -> Self {
        self.form = form;
        self
    }
}

impl AuthRequest for RequestView {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|cookie| cookie.value())
    }

    fn form_field(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }
}
