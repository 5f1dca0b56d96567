//! Decoded event data, stored column-wise

use ndarray::Array2;

/// Values of one parameter across all events.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::UInt32(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_f64(&self, event: usize) -> Option<f64> {
        match self {
            Self::UInt32(v) => v.get(event).map(|&x| x as f64),
            Self::UInt64(v) => v.get(event).map(|&x| x as f64),
            Self::Float32(v) => v.get(event).map(|&x| x as f64),
            Self::Float64(v) => v.get(event).copied(),
        }
    }

    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::UInt32(v) => v.iter().map(|&x| x as f64).collect(),
            Self::UInt64(v) => v.iter().map(|&x| x as f64).collect(),
            Self::Float32(v) => v.iter().map(|&x| x as f64).collect(),
            Self::Float64(v) => v.clone(),
        }
    }
}

/// Event table of one dataset: `names[i]` labels `columns[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EventColumns {
    pub names: Vec<String>,
    pub columns: Vec<ColumnData>,
}

impl EventColumns {
    pub fn new(names: Vec<String>, columns: Vec<ColumnData>) -> Self {
        debug_assert_eq!(names.len(), columns.len());
        Self { names, columns }
    }

    pub fn event_count(&self) -> usize {
        self.columns.first().map_or(0, ColumnData::len)
    }

    pub fn parameter_count(&self) -> usize {
        self.columns.len()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.position(name).map(|i| &self.columns[i])
    }

    /// Events × parameters matrix of all values as `f64`.
    pub fn to_array(&self) -> Array2<f64> {
        let rows = self.event_count();
        let cols = self.parameter_count();
        let mut array = Array2::zeros((rows, cols));
        for (j, column) in self.columns.iter().enumerate() {
            for (i, value) in column.to_f64().into_iter().enumerate() {
                array[[i, j]] = value;
            }
        }
        array
    }
}
