use super::error::EvalError;
use std::{iter::Peekable, str::CharIndices};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    Identifier(String),
    Symbol(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Number(n) => n.to_string(),
            TokenKind::Str(s) => format!("{:?}", s),
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Symbol(symbol) => (*symbol).to_string(),
        }
    }
}

// Longest first so that `===` is not read as `==` followed by `=`.
const SYMBOLS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "(", ")", "[", "]", ".", ",", "?", ":",
    ";", "!", "<", ">", "+", "-", "*", "/", "%", "=",
];

pub fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        let kind = if c.is_whitespace() {
            chars.next();
            continue;
        } else if c.is_ascii_digit() {
            read_number(source, &mut chars, offset)?
        } else if c == '"' || c == '\'' {
            read_string(&mut chars, offset)?
        } else if is_identifier_start(c) {
            let mut name = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !is_identifier_part(c) {
                    break;
                }
                name.push(c);
                chars.next();
            }
            TokenKind::Identifier(name)
        } else {
            let rest = &source[offset..];
            let symbol: &'static str = SYMBOLS
                .iter()
                .copied()
                .find(|symbol| rest.starts_with(symbol))
                .ok_or(EvalError::UnexpectedCharacter {
                    character: c,
                    offset,
                })?;
            for _ in 0..symbol.len() {
                chars.next();
            }
            TokenKind::Symbol(symbol)
        };

        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

fn read_number(
    source: &str,
    chars: &mut Peekable<CharIndices>,
    start: usize,
) -> Result<TokenKind, EvalError> {
    let mut end = start;
    let mut seen_dot = false;
    let mut seen_exponent = false;

    while let Some(&(offset, c)) = chars.peek() {
        let accept = match c {
            '0'..='9' => true,
            '.' if !seen_dot && !seen_exponent => {
                seen_dot = true;
                true
            }
            'e' | 'E' if !seen_exponent => {
                seen_exponent = true;
                true
            }
            '+' | '-' if matches!(source[..offset].chars().last(), Some('e') | Some('E')) => true,
            _ => false,
        };

        if !accept {
            break;
        }

        end = offset + c.len_utf8();
        chars.next();
    }

    let literal = &source[start..end];
    literal
        .parse()
        .map(TokenKind::Number)
        .map_err(|_| EvalError::InvalidNumber {
            literal: literal.into(),
            offset: start,
        })
}

fn read_string(chars: &mut Peekable<CharIndices>, start: usize) -> Result<TokenKind, EvalError> {
    let quote = chars.next().map(|(_, c)| c);
    let mut value = String::new();

    loop {
        let (_, c) = chars
            .next()
            .ok_or(EvalError::UnterminatedString { offset: start })?;

        if Some(c) == quote {
            return Ok(TokenKind::Str(value));
        }

        if c == '\\' {
            let (_, escaped) = chars
                .next()
                .ok_or(EvalError::UnterminatedString { offset: start })?;
            value.push(match escaped {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                '0' => '\0',
                other => other,
            });
        } else {
            value.push(c);
        }
    }
}
