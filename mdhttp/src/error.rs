use crate::{expression::EvalError, request::error::ParseError};
use hyper::http;
use std::{fmt::Display, io};

#[derive(Debug)]
pub enum Error {
    IoError(io::Error),
    ParseError(ParseError),
    EvalError(EvalError),
    UndefinedPlaceholder(String),
    InvalidHeaderName,
    InvalidHeaderValue,
    InvalidUri(String),
    HyperError(hyper::Error),
    HttpError(http::Error),
    JsonError(serde_json::Error),
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IoError: {}", e),
            Error::ParseError(e) => write!(f, "Parse error: {}", e),
            Error::EvalError(e) => write!(f, "Evaluation error: {}", e),
            Error::UndefinedPlaceholder(key) => {
                write!(f, "No value has been stored for placeholder {{{{ {} }}}}", key)
            }
            Error::InvalidHeaderName => write!(f, "Invalid header name"),
            Error::InvalidHeaderValue => write!(f, "Invalid header value"),
            Error::InvalidUri(uri) => write!(f, "Invalid URI: {}", uri),
            Error::HyperError(e) => write!(f, "Hyper error: {}", e),
            Error::HttpError(e) => write!(f, "Http Error: {}", e),
            Error::JsonError(e) => write!(f, "Response body is not valid JSON: {}", e),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::IoError(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::ParseError(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::EvalError(e)
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}

impl From<hyper::Error> for Error {
    fn from(e: hyper::Error) -> Self {
        Error::HyperError(e)
    }
}

impl From<http::Error> for Error {
    fn from(e: http::Error) -> Self {
        Error::HttpError(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonError(e)
    }
}
