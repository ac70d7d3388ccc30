use crate::error::Error;
use lazy_static::lazy_static;
use regex::Regex;
use std::{fs, path::Path};

lazy_static! {
    static ref REQUEST_BLOCK_REGEX: Regex =
        Regex::new(r"(?s)```http request\r?\n(?P<block>.*?)```").unwrap();
}

pub fn load_document<P: AsRef<Path>>(filename: P) -> Result<String, Error> {
    Ok(fs::read_to_string(filename)?)
}

/// Returns the contents of every ```` ```http request ```` fence in document
/// order. An empty fence yields an empty block. A fence that is never closed
/// is skipped.
pub fn find_requests(document: &str) -> Vec<&str> {
    REQUEST_BLOCK_REGEX
        .captures_iter(document)
        .filter_map(|captures| captures.name("block"))
        .map(|block| block.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_blocks_in_document_order() {
        let document = "# API\n\n\
                        ```http request\nGET http://a\n```\n\n\
                        some prose\n\n\
                        ```json\n{}\n```\n\n\
                        ```http request\nPOST http://b\n\nbody\n```\n";

        assert_eq!(
            find_requests(document),
            vec!["GET http://a\n", "POST http://b\n\nbody\n"]
        );
    }

    #[test]
    fn document_without_blocks_yields_nothing() {
        assert!(find_requests("# Nothing here\n\n```\ncode\n```\n").is_empty());
    }

    #[test]
    fn unterminated_block_is_skipped() {
        let document = "```http request\nGET http://a\n```\n```http request\nGET http://b\n";

        assert_eq!(find_requests(document), vec!["GET http://a\n"]);
    }

    #[test]
    fn tag_must_match_exactly() {
        assert!(find_requests("```http\nGET http://a\n```\n").is_empty());
    }

    #[test]
    fn accepts_crlf_after_tag() {
        assert_eq!(
            find_requests("```http request\r\nGET http://a\n```"),
            vec!["GET http://a\n"]
        );
    }

    #[test]
    fn empty_block_does_not_swallow_the_next_one() {
        let document = "```http request\n```\n\ntext\n\n\
                        ```http request\nGET http://a\n>true\n```\n";

        assert_eq!(find_requests(document), vec!["", "GET http://a\n>true\n"]);
    }
}
