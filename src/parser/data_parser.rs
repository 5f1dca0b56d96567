//! Decoding of the DATA segment into per-parameter columns

use crate::error::{FcsError, Result};
use crate::types::dataset::Dataset;
use crate::types::events::{ColumnData, EventColumns};
use crate::types::layout::{ByteOrder, DataLayout, DataMode, DataType};
use crate::types::parameter::{Parameter, ParameterWidth};
use log::debug;
use rayon::prelude::*;

/// Decodes the DATA segment bytes of `dataset` into one column per parameter.
pub fn decode_events(data: &[u8], dataset: &Dataset) -> Result<EventColumns> {
    let layout = &dataset.layout;
    if layout.mode != DataMode::List {
        return Err(FcsError::Unsupported(format!(
            "{:?} histogram data mode",
            layout.mode
        )));
    }

    let names = dataset
        .parameters
        .iter()
        .map(|p| p.short_name.clone())
        .collect();

    let columns = if is_delimited_ascii(layout.data_type, &dataset.parameters) {
        decode_delimited_ascii(data, layout)?
    } else {
        decode_fixed_width(data, layout, &dataset.parameters)?
    };

    Ok(EventColumns::new(names, columns))
}

pub(crate) fn is_delimited_ascii(data_type: DataType, parameters: &[Parameter]) -> bool {
    data_type == DataType::Ascii
        && parameters
            .iter()
            .any(|p| p.width == ParameterWidth::Delimited)
}

/// Bytes per event for fixed-width layouts.
pub(crate) fn event_stride(data_type: DataType, parameters: &[Parameter]) -> Result<usize> {
    parameters
        .iter()
        .map(|p| field_width(data_type, p))
        .sum()
}

/// Number of values in a delimited ASCII DATA segment.
pub(crate) fn count_delimited_values(data: &[u8]) -> usize {
    ascii_fields(data).count()
}

fn field_width(data_type: DataType, parameter: &Parameter) -> Result<usize> {
    let Some(bytes) = parameter.width.field_bytes(data_type) else {
        return Err(FcsError::Unsupported(format!(
            "$P{}B=* is only valid for ASCII data",
            parameter.index
        )));
    };

    let bits = bytes * 8;
    let valid = match data_type {
        DataType::Integer => {
            matches!(parameter.width, ParameterWidth::Bits(b) if b % 8 == 0)
                && (1..=8).contains(&bytes)
        }
        DataType::Float => bits == 32,
        DataType::Double => bits == 64,
        DataType::Ascii => bytes > 0,
    };
    if !valid {
        return Err(FcsError::Unsupported(format!(
            "{:?} data with $P{}B={:?}",
            data_type, parameter.index, parameter.width
        )));
    }
    Ok(bytes)
}

/// `$TOT` so large that the DATA size it implies does not fit in an integer.
fn event_count_overflow(layout: &DataLayout) -> FcsError {
    FcsError::invalid_keyword("$TOT", layout.events.to_string())
}

fn decode_fixed_width(
    data: &[u8],
    layout: &DataLayout,
    parameters: &[Parameter],
) -> Result<Vec<ColumnData>> {
    let widths = parameters
        .iter()
        .map(|p| field_width(layout.data_type, p))
        .collect::<Result<Vec<_>>>()?;
    let stride: usize = widths.iter().sum();

    let expected = (layout.events as u64)
        .checked_mul(stride as u64)
        .ok_or_else(|| event_count_overflow(layout))?;
    let available = data.len() as u64;
    if available < expected {
        return Err(FcsError::DataSegmentTooShort { expected, available });
    }
    if available > expected {
        debug!(
            "DATA segment has {} bytes beyond the {} events declared",
            available - expected,
            layout.events
        );
    }

    if let ByteOrder::Permuted(order) = &layout.byte_order {
        if layout.data_type != DataType::Ascii && widths.iter().any(|&w| w != order.len()) {
            return Err(FcsError::Unsupported(format!(
                "$BYTEORD permutation of {} bytes with mixed parameter widths",
                order.len()
            )));
        }
    }

    let offsets: Vec<usize> = widths
        .iter()
        .scan(0usize, |acc, &w| {
            let start = *acc;
            *acc += w;
            Some(start)
        })
        .collect();

    let data = &data[..expected as usize];
    parameters
        .par_iter()
        .zip(offsets.par_iter().zip(widths.par_iter()))
        .map(|(parameter, (&offset, &width))| {
            let field = FieldLayout {
                offset,
                width,
                stride,
                events: layout.events,
            };
            match layout.data_type {
                DataType::Integer => {
                    decode_integer(data, field, &layout.byte_order, parameter.bit_mask())
                }
                DataType::Float => decode_float(data, field, &layout.byte_order),
                DataType::Double => decode_double(data, field, &layout.byte_order),
                DataType::Ascii => decode_fixed_ascii(data, field, parameter),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct FieldLayout {
    offset: usize,
    width: usize,
    stride: usize,
    events: usize,
}

impl FieldLayout {
    fn fields<'a>(self, data: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        let FieldLayout { offset, width, stride, events } = self;
        (0..events).map(move |event| {
            let start = event * stride + offset;
            &data[start..start + width]
        })
    }

    /// Fields copied into little-endian 8-byte buffers.
    fn le_fields<'a>(
        self,
        data: &'a [u8],
        order: &'a ByteOrder,
    ) -> impl Iterator<Item = Result<[u8; 8]>> + 'a {
        let width = self.width;
        self.fields(data).map(move |raw| -> Result<[u8; 8]> {
            let mut buf = [0u8; 8];
            buf[..width].copy_from_slice(raw);
            order.to_little_endian(&mut buf[..width])?;
            Ok(buf)
        })
    }
}

fn decode_integer(
    data: &[u8],
    field: FieldLayout,
    order: &ByteOrder,
    mask: u64,
) -> Result<ColumnData> {
    let values = field
        .le_fields(data, order)
        .map(|buf| buf.map(|b| u64::from_le_bytes(b) & mask));

    if field.width <= 4 {
        values
            .map(|v| v.map(|v| v as u32))
            .collect::<Result<Vec<_>>>()
            .map(ColumnData::UInt32)
    } else {
        values.collect::<Result<Vec<_>>>().map(ColumnData::UInt64)
    }
}

fn decode_float(data: &[u8], field: FieldLayout, order: &ByteOrder) -> Result<ColumnData> {
    field
        .le_fields(data, order)
        .map(|buf| buf.map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])))
        .collect::<Result<Vec<_>>>()
        .map(ColumnData::Float32)
}

fn decode_double(data: &[u8], field: FieldLayout, order: &ByteOrder) -> Result<ColumnData> {
    field
        .le_fields(data, order)
        .map(|buf| buf.map(f64::from_le_bytes))
        .collect::<Result<Vec<_>>>()
        .map(ColumnData::Float64)
}

fn decode_fixed_ascii(data: &[u8], field: FieldLayout, parameter: &Parameter) -> Result<ColumnData> {
    field
        .fields(data)
        .enumerate()
        .map(|(event, raw)| {
            parse_ascii_value(raw).ok_or_else(|| {
                FcsError::InvalidData(format!(
                    "event {} of parameter {} holds {:?}",
                    event,
                    parameter.short_name,
                    String::from_utf8_lossy(raw)
                ))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(ColumnData::Float64)
}

fn decode_delimited_ascii(data: &[u8], layout: &DataLayout) -> Result<Vec<ColumnData>> {
    let parameter_count = layout.parameter_count;
    let needed = layout
        .events
        .checked_mul(parameter_count)
        .ok_or_else(|| event_count_overflow(layout))?;

    let values = ascii_fields(data)
        .take(needed)
        .map(|raw| {
            parse_ascii_value(raw).ok_or_else(|| {
                FcsError::InvalidData(format!(
                    "value {:?} is not a number",
                    String::from_utf8_lossy(raw)
                ))
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.len() < needed {
        return Err(FcsError::InvalidData(format!(
            "expected {} delimited values but found {}",
            needed,
            values.len()
        )));
    }

    Ok((0..parameter_count)
        .map(|p| {
            let column = values
                .iter()
                .skip(p)
                .step_by(parameter_count)
                .copied()
                .collect();
            ColumnData::Float64(column)
        })
        .collect())
}

fn ascii_fields(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    data.split(|b| b.is_ascii_whitespace() || *b == b',')
        .filter(|field| !field.is_empty())
}

fn parse_ascii_value(raw: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(raw).ok()?.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    text.parse().ok()
}
