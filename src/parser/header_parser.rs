use crate::error::FcsError;
use crate::types::header::{FcsVersion, Header, SegmentRange};
use winnow::{
    Parser,
    combinator::repeat,
    error::{ContextError, StrContext},
    token::take,
};

/// Fixed part of the HEADER: version, padding and six offset fields.
pub const HEADER_LEN: usize = 58;

/// Parses the HEADER segment at the start of `bytes`.
///
/// The layout is as follows:
/// - 6 bytes: version identifier (`FCS3.1`)
/// - 4 bytes: spaces
/// - 6 × 8 bytes: ASCII, right-justified offsets of TEXT, DATA and ANALYSIS
///   (begin and end of each; blank fields mean 0)
/// - optional 8-byte begin/end pairs for OTHER segments, up to the TEXT start
pub fn parse_header(bytes: &[u8]) -> Result<Header, FcsError> {
    let mut input = bytes;
    header
        .parse_next(&mut input)
        .map_err(|e| FcsError::InvalidHeader(e.to_string()))
}

fn header(input: &mut &[u8]) -> Result<Header, ContextError> {
    let version = take(6usize)
        .verify_map(FcsVersion::from_magic)
        .context(StrContext::Label("version identifier"))
        .parse_next(input)?;
    take(4usize).void().parse_next(input)?;

    let text = segment.context(StrContext::Label("TEXT offsets")).parse_next(input)?;
    let data = segment.context(StrContext::Label("DATA offsets")).parse_next(input)?;
    let analysis = segment
        .context(StrContext::Label("ANALYSIS offsets"))
        .parse_next(input)?;

    // OTHER segment offsets may fill the space between the fixed header and TEXT
    let extra = (text.start as usize)
        .saturating_sub(HEADER_LEN)
        .min(input.len());
    let mut other_area = take(extra).parse_next(input)?;
    let other: Vec<SegmentRange> = repeat(0.., segment).parse_next(&mut other_area)?;

    Ok(Header::builder()
        .version(version)
        .text(text)
        .data(data)
        .analysis(analysis)
        .other(other.into_iter().filter(|s| !s.is_empty()).collect())
        .build())
}

fn segment(input: &mut &[u8]) -> Result<SegmentRange, ContextError> {
    (offset_field, offset_field)
        .map(|(start, end)| SegmentRange::new(start, end))
        .parse_next(input)
}

fn offset_field(input: &mut &[u8]) -> Result<u64, ContextError> {
    take(8usize).verify_map(ascii_offset).parse_next(input)
}

fn ascii_offset(raw: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(raw).ok()?.trim();
    if text.is_empty() {
        return Some(0);
    }
    text.parse().ok()
}
