use crate::error::{FcsError, Result};
use crate::options::{ChannelNaming, ReaderOptions};
use crate::parser::{decode_events, parse_dataset, segment_bytes};
use crate::processing::{compensate, scale, to_dataframe};
use crate::types::{Dataset, EventColumns, Keywords, Spillover};
use crate::utils::file_utils::read_binary_file_mmap;
use log::{debug, warn};
use memmap2::Mmap;
use polars::prelude::DataFrame;
use std::fmt;
use std::ops::Deref;
use std::path::Path;

enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for Source {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Source::Mapped(mmap) => mmap,
            Source::Owned(bytes) => bytes,
        }
    }
}

/// A parsed FCS file: every dataset along the `$NEXTDATA` chain, with the
/// file contents kept around for lazy decoding of DATA segments.
pub struct FcsFile {
    source: Source,
    datasets: Vec<Dataset>,
}

impl FcsFile {
    /// Memory-map and parse the FCS file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, false)
    }

    pub fn open_with(path: impl AsRef<Path>, strict: bool) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening {}", path.display());
        let mmap = read_binary_file_mmap(path)?;
        Self::from_source(Source::Mapped(mmap), strict)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with(bytes, false)
    }

    pub fn from_bytes_with(bytes: Vec<u8>, strict: bool) -> Result<Self> {
        Self::from_source(Source::Owned(bytes), strict)
    }

    fn from_source(source: Source, strict: bool) -> Result<Self> {
        let datasets = walk_datasets(&source, strict)?;
        Ok(Self { source, datasets })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.source
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    /// Dataset `index` (zero-based) along the `$NEXTDATA` chain.
    pub fn dataset(&self, index: usize) -> Result<&Dataset> {
        self.datasets.get(index).ok_or(FcsError::DatasetNotFound {
            requested: index,
            available: self.datasets.len(),
        })
    }

    /// Raw DATA segment bytes of dataset `index`.
    pub fn data_bytes(&self, index: usize) -> Result<&[u8]> {
        let dataset = self.dataset(index)?;
        Ok(segment_bytes(&self.source, dataset.data))
    }

    /// Decoded channel values of dataset `index`, named by `$PnN`.
    pub fn events(&self, index: usize) -> Result<EventColumns> {
        let dataset = self.dataset(index)?;
        decode_events(segment_bytes(&self.source, dataset.data), dataset)
    }

    /// Decoded events after the scaling, compensation and naming steps
    /// selected in `options`.
    pub fn processed_events(&self, index: usize, options: &ReaderOptions) -> Result<EventColumns> {
        let dataset = self.dataset(index)?;
        let mut events = self.events(index)?;

        if options.scale {
            events = scale(&events, &dataset.parameters);
        }
        if options.compensate {
            match Spillover::from_keywords(&dataset.keywords)? {
                Some(spillover) => events = compensate(&events, &spillover)?,
                None => warn!("dataset {} has no spillover matrix; not compensating", index),
            }
        }
        if options.naming == ChannelNaming::Long {
            events.names = dataset
                .parameters
                .iter()
                .map(|p| p.display_name(true).to_string())
                .collect();
        }
        Ok(events)
    }

    pub fn to_dataframe(&self, index: usize, options: &ReaderOptions) -> Result<DataFrame> {
        let events = self.processed_events(index, options)?;
        Ok(to_dataframe(&events, &events.names, options.cast_to_int)?)
    }

    /// Keywords of the ANALYSIS segment of dataset `index`, if it has one.
    pub fn analysis(&self, index: usize) -> Result<Option<Keywords>> {
        self.dataset(index)?.analysis_keywords(&self.source)
    }

    /// Get a summary of the file contents
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FcsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} dataset(s), {} bytes", self.datasets.len(), self.source.len())?;

        for (i, dataset) in self.datasets.iter().enumerate() {
            writeln!(
                f,
                "\nDataset {} ({} at byte {}):",
                i,
                dataset.version(),
                dataset.offset
            )?;
            writeln!(
                f,
                "  Events: {}  Parameters: {}  Data type: {:?}",
                dataset.event_count(),
                dataset.parameters.len(),
                dataset.layout.data_type
            )?;
            for key in ["$CYT", "$DATE", "$FIL"] {
                if let Some(value) = dataset.keywords.get(key) {
                    writeln!(f, "  {}: {}", key, value)?;
                }
            }
            for parameter in &dataset.parameters {
                write!(f, "  P{}: {}", parameter.index, parameter.short_name)?;
                if let Some(long) = &parameter.long_name {
                    write!(f, " ({})", long)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Follows `$NEXTDATA` from the start of the file. The first dataset must
/// parse; the walk stops at a link that does not move forward inside the file
/// or, unless `strict`, at a dataset that fails to parse.
fn walk_datasets(file: &[u8], strict: bool) -> Result<Vec<Dataset>> {
    let file_len = file.len() as u64;
    let mut datasets = vec![parse_dataset(file, 0, strict)?];

    while let Some((current, next)) = datasets.last().and_then(|d| d.next.map(|n| (d.offset, n))) {
        if next <= current || next >= file_len {
            warn!(
                "$NEXTDATA of dataset at byte {} points to {}, outside the file or backwards; stopping",
                current, next
            );
            break;
        }
        match parse_dataset(file, next, strict) {
            Ok(dataset) => datasets.push(dataset),
            Err(err) if !strict => {
                warn!("skipping datasets from byte {}: {}", next, err);
                break;
            }
            Err(err) => return Err(err),
        }
    }

    debug!("found {} dataset(s)", datasets.len());
    Ok(datasets)
}
