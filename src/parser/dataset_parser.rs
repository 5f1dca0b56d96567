//! Assembles a [`Dataset`] from the HEADER and TEXT segments at a given file offset

use crate::error::{FcsError, Result};
use crate::parser::data_parser::{count_delimited_values, event_stride, is_delimited_ascii};
use crate::parser::header_parser::parse_header;
use crate::parser::text_parser::parse_text;
use crate::types::dataset::Dataset;
use crate::types::header::{FcsVersion, SegmentRange};
use crate::types::keywords::Keywords;
use crate::types::layout::{ByteOrder, DataLayout, DataMode, DataType};
use crate::types::parameter::Parameter;
use log::{debug, warn};

/// Parses the dataset whose HEADER starts at absolute `offset` in `file`.
///
/// With `strict` set, inconsistencies that are otherwise tolerated with a
/// warning (disagreeing offsets, segments ending one byte past the file) are errors.
pub fn parse_dataset(file: &[u8], offset: u64, strict: bool) -> Result<Dataset> {
    let file_len = file.len() as u64;
    if offset >= file_len {
        return Err(FcsError::SegmentOutOfBounds {
            segment: "HEADER",
            start: offset,
            end: offset,
            file_len,
        });
    }

    let header = parse_header(&file[offset as usize..])?;
    debug!(
        "{} dataset at {}: TEXT {:?}, DATA {:?}, ANALYSIS {:?}",
        header.version, offset, header.text, header.data, header.analysis
    );

    if header.text.is_empty() {
        return Err(FcsError::InvalidHeader("TEXT segment is empty".into()));
    }
    let text = absolute("TEXT", header.text, offset, file_len)?;
    let text = bounded("TEXT", text, file_len, strict)?;
    let mut keywords = parse_text(segment_bytes(file, text))?;

    let supplemental_text = keyword_range(&keywords, "$BEGINSTEXT", "$ENDSTEXT")?.unwrap_or_default();
    let mut supplemental_text = absolute("supplemental TEXT", supplemental_text, offset, file_len)?;
    if !supplemental_text.is_empty() && supplemental_text != text {
        supplemental_text = bounded("supplemental TEXT", supplemental_text, file_len, strict)?;
        let extra = parse_text(segment_bytes(file, supplemental_text))?;
        debug!("merging {} supplemental TEXT keywords", extra.len());
        keywords.merge_missing(extra);
    }

    let data = resolve_segment("DATA", header.data, &keywords, "$BEGINDATA", "$ENDDATA", strict)?;
    let data = absolute("DATA", data, offset, file_len)?;
    let data = bounded("DATA", data, file_len, strict)?;
    let analysis = resolve_segment(
        "ANALYSIS",
        header.analysis,
        &keywords,
        "$BEGINANALYSIS",
        "$ENDANALYSIS",
        strict,
    )?;
    let analysis = absolute("ANALYSIS", analysis, offset, file_len)?;
    let analysis = bounded("ANALYSIS", analysis, file_len, strict)?;

    let parameter_count: usize = keywords.parse_required("$PAR")?;
    let parameters = (1..=parameter_count)
        .map(|n| Parameter::from_keywords(&keywords, n))
        .collect::<Result<Vec<_>>>()?;

    let data_type = DataType::from_keyword(keywords.get_required("$DATATYPE")?)?;
    let byte_order = match (keywords.get("$BYTEORD"), data_type) {
        (Some(value), _) => ByteOrder::from_keyword(value)?,
        (None, DataType::Ascii) => ByteOrder::LittleEndian,
        (None, _) => return Err(FcsError::MissingKeyword("$BYTEORD".into())),
    };
    let mode = DataMode::from_keyword(keywords.get_required("$MODE")?)?;

    let events = match keywords.parse::<usize>("$TOT")? {
        Some(events) => events,
        None if header.version == FcsVersion::Fcs2_0 => {
            infer_event_count(segment_bytes(file, data), data_type, &parameters)?
        }
        None => return Err(FcsError::MissingKeyword("$TOT".into())),
    };

    let layout = DataLayout::builder()
        .data_type(data_type)
        .byte_order(byte_order)
        .mode(mode)
        .events(events)
        .parameter_count(parameter_count)
        .build();

    let next = match keywords.parse::<u64>("$NEXTDATA")? {
        Some(0) | None => None,
        Some(relative) => {
            let next = offset.checked_add(relative);
            if next.is_none() {
                warn!(
                    "$NEXTDATA {} of dataset at byte {} overflows the file offset; ignoring it",
                    relative, offset
                );
            }
            next
        }
    };

    Ok(Dataset::builder()
        .offset(offset)
        .header(header)
        .keywords(keywords)
        .parameters(parameters)
        .layout(layout)
        .text(text)
        .supplemental_text(supplemental_text)
        .data(data)
        .analysis(analysis)
        .maybe_next(next)
        .build())
}

/// Bytes covered by an absolute, bounds-checked range.
pub(crate) fn segment_bytes(file: &[u8], range: SegmentRange) -> &[u8] {
    if range.is_empty() {
        return &[];
    }
    &file[range.start as usize..=range.end as usize]
}

fn keyword_range(keywords: &Keywords, begin: &str, end: &str) -> Result<Option<SegmentRange>> {
    match (keywords.parse::<u64>(begin)?, keywords.parse::<u64>(end)?) {
        (Some(start), Some(end)) => Ok(Some(SegmentRange::new(start, end))),
        _ => Ok(None),
    }
}

/// HEADER offsets win; TEXT keywords are used when the HEADER fields are 0,
/// which is how offsets beyond 99,999,999 are written.
fn resolve_segment(
    segment: &str,
    from_header: SegmentRange,
    keywords: &Keywords,
    begin: &str,
    end: &str,
    strict: bool,
) -> Result<SegmentRange> {
    let from_text = keyword_range(keywords, begin, end)?;
    if from_header.is_empty() {
        return Ok(from_text.unwrap_or_default());
    }

    if let Some(from_text) = from_text.filter(|r| !r.is_empty() && *r != from_header) {
        let message = format!(
            "{} offsets in HEADER {:?} disagree with {}/{} {:?}",
            segment, from_header, begin, end, from_text
        );
        if strict {
            return Err(FcsError::InvalidHeader(message));
        }
        warn!("{}; using HEADER offsets", message);
    }
    Ok(from_header)
}

/// Dataset-relative `range` moved to file offsets.
fn absolute(
    segment: &'static str,
    range: SegmentRange,
    offset: u64,
    file_len: u64,
) -> Result<SegmentRange> {
    range.offset_by(offset).ok_or(FcsError::SegmentOutOfBounds {
        segment,
        start: range.start,
        end: range.end,
        file_len,
    })
}

fn bounded(
    segment: &'static str,
    range: SegmentRange,
    file_len: u64,
    strict: bool,
) -> Result<SegmentRange> {
    if range.is_empty() || range.end < file_len {
        return Ok(range);
    }
    // Some writers point the end offset one byte past the file.
    if range.end == file_len && !strict && range.start < file_len {
        warn!("{} segment ends one byte past the end of the file; truncating", segment);
        return Ok(SegmentRange::new(range.start, file_len - 1));
    }
    Err(FcsError::SegmentOutOfBounds {
        segment,
        start: range.start,
        end: range.end,
        file_len,
    })
}

fn infer_event_count(data: &[u8], data_type: DataType, parameters: &[Parameter]) -> Result<usize> {
    if parameters.is_empty() {
        return Ok(0);
    }
    let events = if is_delimited_ascii(data_type, parameters) {
        count_delimited_values(data) / parameters.len()
    } else {
        match event_stride(data_type, parameters)? {
            0 => 0,
            stride => data.len() / stride,
        }
    };
    debug!("$TOT missing; inferred {} events from the DATA segment", events);
    Ok(events)
}
