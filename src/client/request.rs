//! Per-call request options.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;

/// Method, JSON body and extra headers of one gateway call.
///
/// Headers set here override the gateway defaults, except `Authorization`,
/// which is dropped: the session store alone decides the credential.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub(crate) method: Method,
    pub(crate) body: Option<Value>,
    pub(crate) headers: HeaderMap,
}

impl RequestOptions {
    /// Options for the given method, without body.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// GET without body.
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    /// POST without body.
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a header, replacing any previous value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}
