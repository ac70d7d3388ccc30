use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingRequestLine { context: String },
    UnsupportedMethod(String),
}

impl std::error::Error for ParseError {}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingRequestLine { context } => write!(
                f,
                "Expected `<METHOD> <URL>` at the start of the block, found \"{}\"",
                context.escape_default()
            ),
            ParseError::UnsupportedMethod(method) => {
                write!(f, "Unsupported request method: {}", method)
            }
        }
    }
}
