use crate::request::{Headers, Method};

/// A request after interpolation, as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestData {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: Headers,
    pub body: String,
}

impl ResponseData {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
