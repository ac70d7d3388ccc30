use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    UnexpectedCharacter { character: char, offset: usize },
    UnterminatedString { offset: usize },
    InvalidNumber { literal: String, offset: usize },
    UnexpectedToken { found: String, offset: usize },
    UnexpectedEnd,
    UnknownIdentifier(String),
    InvalidAssignmentTarget,
    ReadOnlyProperty(String),
    PropertyOfNothing { property: String, object: &'static str },
    NotAFunction(String),
    UnsupportedCall,
}

impl std::error::Error for EvalError {}

impl Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::UnexpectedCharacter { character, offset } => write!(
                f,
                "Unexpected character '{}' at offset {}",
                character.escape_default(),
                offset
            ),
            EvalError::UnterminatedString { offset } => {
                write!(f, "Unterminated string literal starting at offset {}", offset)
            }
            EvalError::InvalidNumber { literal, offset } => {
                write!(f, "Invalid number literal \"{}\" at offset {}", literal, offset)
            }
            EvalError::UnexpectedToken { found, offset } => {
                write!(f, "Unexpected token \"{}\" at offset {}", found, offset)
            }
            EvalError::UnexpectedEnd => write!(f, "Unexpected end of expression"),
            EvalError::UnknownIdentifier(name) => write!(f, "{} is not defined", name),
            EvalError::InvalidAssignmentTarget => write!(
                f,
                "Only store.<key>, store[<key>] and this.<key> can be assigned"
            ),
            EvalError::ReadOnlyProperty(name) => write!(f, "this.{} is read-only", name),
            EvalError::PropertyOfNothing { property, object } => write!(
                f,
                "Cannot read property '{}' of {}",
                property, object
            ),
            EvalError::NotAFunction(name) => write!(f, "{} is not a function", name),
            EvalError::UnsupportedCall => write!(f, "Only method calls like a.includes(b) are supported"),
        }
    }
}
