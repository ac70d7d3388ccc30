use super::{error::ParseError, Headers, Method, RequestSpec, Trailer};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref REQUEST_LINE_REGEX: Regex =
        Regex::new(r"^(?P<method>[A-Z]+)\s+(?P<url>[^\n]+)\n").unwrap();
    static ref HEADER_LIST_REGEX: Regex = Regex::new(r"^[^>%]+?\r?\n\r?\n").unwrap();
    static ref BODY_REGEX: Regex = Regex::new(r"^[^>%]+\n").unwrap();
    static ref BLANK_LINES_REGEX: Regex = Regex::new(r"^(?:\r?\n)+").unwrap();
    static ref ASSERTION_REGEX: Regex = Regex::new(r"^>(?P<source>[^\r\n]+)\r?\n").unwrap();
    static ref SIDE_EFFECT_REGEX: Regex = Regex::new(r"^%(?P<source>[^\r\n]+)\r?\n").unwrap();
    static ref HEADER_REGEX: Regex =
        Regex::new(r"(?P<header_key>[^:]+):(?P<header_value>[^\n]+)\n").unwrap();
}

/// Walks a block front to back. Each rule is anchored at the cursor; a
/// successful match moves the cursor past it and then past any run of
/// plain spaces (tabs and newlines are left alone).
struct Cursor<'a> {
    data: &'a str,
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a str) -> Self {
        Self { data, index: 0 }
    }

    fn apply(&mut self, rule: &Regex) -> Option<Captures<'a>> {
        let data = self.data;
        let captures = rule.captures(&data[self.index..])?;
        let matched = captures.get(0)?;

        self.index += matched.end();
        self.index += data[self.index..]
            .bytes()
            .take_while(|b| *b == b' ')
            .count();

        Some(captures)
    }

    fn context(&self) -> String {
        self.data[self.index..]
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(60)
            .collect()
    }
}

/// Parses a single `http request` block.
///
/// Grammar, in order: request line, header run closed by a blank line,
/// body, then any number of `>assertion` / `%side effect` lines. A body
/// line starting with `>` or `%` cannot be expressed.
pub fn parse_request(data: &str) -> Result<RequestSpec, ParseError> {
    let mut cursor = Cursor::new(data);

    let (method, url) = parse_request_line(&mut cursor)?;
    let headers = parse_header_block(&mut cursor);
    let body = parse_body(&mut cursor);
    let trailers = parse_trailers(&mut cursor);

    Ok(RequestSpec {
        method,
        url,
        headers,
        body,
        trailers,
    })
}

fn parse_request_line(cursor: &mut Cursor) -> Result<(Method, String), ParseError> {
    let context = cursor.context();
    let captures = cursor
        .apply(&REQUEST_LINE_REGEX)
        .ok_or(ParseError::MissingRequestLine { context })?;

    let method = captures["method"].trim().parse()?;
    let url = captures["url"].trim().to_string();

    Ok((method, url))
}

fn parse_header_block(cursor: &mut Cursor) -> Headers {
    let mut headers = Headers::new();

    if let Some(captures) = cursor.apply(&HEADER_LIST_REGEX) {
        for capture in HEADER_REGEX.captures_iter(&captures[0]) {
            headers.insert(
                String::from(capture["header_key"].trim()),
                String::from(capture["header_value"].trim()),
            );
        }
    }

    headers
}

fn parse_body(cursor: &mut Cursor) -> Option<String> {
    let captures = cursor.apply(&BODY_REGEX)?;
    let body = captures[0].trim();

    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

fn parse_trailers(cursor: &mut Cursor) -> Vec<Trailer> {
    let mut trailers = Vec::new();

    loop {
        cursor.apply(&BLANK_LINES_REGEX);

        if let Some(captures) = cursor.apply(&ASSERTION_REGEX) {
            trailers.push(Trailer::Assertion(captures["source"].to_string()));
            continue;
        }

        if let Some(captures) = cursor.apply(&SIDE_EFFECT_REGEX) {
            trailers.push(Trailer::SideEffect(captures["source"].to_string()));
            continue;
        }

        break;
    }

    trailers
}
