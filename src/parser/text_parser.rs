//! Parser for delimiter-separated keyword/value segments (TEXT, supplemental TEXT, ANALYSIS)

use crate::error::FcsError;
use crate::types::keywords::Keywords;
use itertools::Itertools;
use log::warn;
use winnow::{
    Parser,
    error::ContextError,
    token::{any, take_till},
};

/// Parses a keyword segment. The first byte is the delimiter used throughout
/// the segment; a doubled delimiter is a literal delimiter inside a token.
pub fn parse_text(segment: &[u8]) -> Result<Keywords, FcsError> {
    let mut input = segment;
    let delimiter = any::<_, ContextError>
        .parse_next(&mut input)
        .map_err(|_| FcsError::InvalidText("segment is empty".into()))?;

    if delimiter.is_ascii_digit() || delimiter == b'.' || delimiter == b'-' {
        return Err(FcsError::InvalidText(format!(
            "delimiter {:?} can appear inside numeric values",
            delimiter as char
        )));
    }

    let mut tokens = Vec::new();
    let mut terminated = true;
    while !input.is_empty() {
        let (token, closed) = text_token(&mut input, delimiter)
            .map_err(|e| FcsError::InvalidText(e.to_string()))?;
        tokens.push(token);
        terminated = closed;
    }

    // A segment ending without its closing delimiter still yields its last token.
    // Blank bytes after the closing delimiter are padding, not a value.
    if !terminated && tokens.last().is_some_and(|t| t.iter().all(u8::is_ascii_whitespace)) {
        tokens.pop();
    }

    if tokens.len() % 2 != 0 {
        if let Some(dropped) = tokens.pop() {
            warn!(
                "TEXT segment has an unpaired trailing token {:?}; ignoring it",
                String::from_utf8_lossy(&dropped)
            );
        }
    }

    let keywords = tokens
        .into_iter()
        .tuples()
        .map(|(key, value)| {
            (
                String::from_utf8_lossy(&key).into_owned(),
                String::from_utf8_lossy(&value).into_owned(),
            )
        })
        .filter(|(key, _)| !key.trim().is_empty())
        .collect();
    Ok(keywords)
}

/// One token, up to and including its terminating delimiter (or the end of input).
/// The flag tells whether the token was closed by a delimiter.
fn text_token(input: &mut &[u8], delimiter: u8) -> Result<(Vec<u8>, bool), ContextError> {
    let mut token = Vec::new();
    loop {
        let run = take_till(0.., |b: u8| b == delimiter).parse_next(input)?;
        token.extend_from_slice(run);

        if input.is_empty() {
            return Ok((token, false));
        }
        if input.get(1) == Some(&delimiter) {
            token.push(delimiter);
            *input = &input[2..];
        } else {
            *input = &input[1..];
            return Ok((token, true));
        }
    }
}
