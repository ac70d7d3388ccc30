use lazy_static::lazy_static;
use regex::Regex;
use std::{
    fmt::Display,
    io::{self, Write},
    mem,
};

pub mod ansi {
    pub const RED: &str = "\u{1b}[31m";
    pub const GREEN: &str = "\u{1b}[32m";
    pub const CYAN: &str = "\u{1b}[36m";
    pub const RESET: &str = "\u{1b}[0m";
}

lazy_static! {
    static ref ESCAPE_CODE_REGEX: Regex = Regex::new("\u{1b}\\[[0-9;]*m").unwrap();
}

/// A console writer that knows how many line feeds currently end its output.
///
/// Formatting codes passed to [`Output::format`] are held back and written in
/// front of the next logged content, so a trailing color reset never produces
/// an empty line of its own. Call [`Output::flush`] before giving up on the
/// writer so that a held code is not lost.
#[derive(Debug)]
pub struct Output<W: Write> {
    writer: W,
    color: bool,
    line_feeds: usize,
    pending: String,
}

impl<W: Write> Output<W> {
    pub fn new(writer: W, color: bool) -> Self {
        Self {
            writer,
            color,
            line_feeds: 0,
            pending: String::new(),
        }
    }

    pub fn line_feeds(&self) -> usize {
        self.line_feeds
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Returns `code`, or nothing when color is disabled.
    pub fn code<'a>(&self, code: &'a str) -> &'a str {
        if self.color {
            code
        } else {
            ""
        }
    }

    /// Writes just enough line feeds for the output to end with `count` of
    /// them. Does nothing when that many are already there.
    pub fn insert_line_feeds(&mut self, count: usize) -> io::Result<()> {
        if self.line_feeds < count {
            let missing = count - self.line_feeds;
            self.writer.write_all("\n".repeat(missing).as_bytes())?;
            self.line_feeds = count;
        }

        Ok(())
    }

    pub fn format(&mut self, code: &str) {
        if self.color {
            self.pending.push_str(code);
        }
    }

    /// Writes any held codes, then `content` and a line feed.
    pub fn log<D: Display>(&mut self, content: D) -> io::Result<()> {
        let content = format!("{}\n", content);
        let pending = mem::take(&mut self.pending);

        self.writer.write_all(pending.as_bytes())?;
        self.writer.write_all(content.as_bytes())?;

        let visible = ESCAPE_CODE_REGEX.replace_all(&content, "");
        let trailing = visible.chars().rev().take_while(|c| *c == '\n').count();

        if trailing == visible.chars().count() {
            self.line_feeds += trailing;
        } else {
            self.line_feeds = trailing;
        }

        Ok(())
    }

    /// Writes held codes even though no content follows.
    pub fn flush(&mut self) -> io::Result<()> {
        let pending = mem::take(&mut self.pending);

        self.writer.write_all(pending.as_bytes())?;
        self.writer.flush()
    }

    /// Flushes and forgets the line feed count, for use after output was
    /// interrupted.
    pub fn reset(&mut self) -> io::Result<()> {
        self.flush()?;
        self.line_feeds = 0;

        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub fn add_to_lines(prefix: &str, value: &str) -> String {
    value
        .split('\n')
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}
