pub mod error;
mod parser;

use error::ParseError;
use indexmap::IndexMap;
use std::{fmt::Display, str::FromStr};

pub use parser::parse_request;

/// Header names keep their spelling and insertion order; a repeated name
/// replaces the earlier value in place.
pub type Headers = IndexMap<String, String>;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            other => Err(ParseError::UnsupportedMethod(other.into())),
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `>` or `%` line following the body, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trailer {
    Assertion(String),
    SideEffect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
    pub trailers: Vec<Trailer>,
}

impl RequestSpec {
    pub fn tests(&self) -> impl Iterator<Item = &str> {
        self.trailers.iter().filter_map(|trailer| match trailer {
            Trailer::Assertion(source) => Some(source.as_str()),
            Trailer::SideEffect(_) => None,
        })
    }

    pub fn sides(&self) -> impl Iterator<Item = &str> {
        self.trailers.iter().filter_map(|trailer| match trailer {
            Trailer::SideEffect(source) => Some(source.as_str()),
            Trailer::Assertion(_) => None,
        })
    }
}
