use crate::error::{FcsError, Result};
use crate::types::events::{ColumnData, EventColumns};
use crate::types::spillover::Spillover;
use ndarray::{Array2, Axis, s};

const PIVOT_EPSILON: f64 = 1e-12;

/// Applies `spillover` to the matching columns of `events`: the observed values
/// of the spillover parameters are multiplied by the inverse spillover matrix.
/// Columns not named in the spillover are left as they are.
pub fn compensate(events: &EventColumns, spillover: &Spillover) -> Result<EventColumns> {
    let indices = spillover
        .parameters
        .iter()
        .map(|name| {
            events
                .position(name)
                .ok_or_else(|| FcsError::UnknownParameter(name.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let inverse = invert(&spillover.matrix)?;

    let observed = events.to_array().select(Axis(1), &indices);
    let corrected = observed.dot(&inverse);

    let mut columns = events.columns.clone();
    for (j, &index) in indices.iter().enumerate() {
        columns[index] = ColumnData::Float64(corrected.index_axis(Axis(1), j).to_vec());
    }
    Ok(EventColumns::new(events.names.clone(), columns))
}

/// Inverse of a square matrix by Gauss-Jordan elimination with partial pivoting.
pub fn invert(matrix: &Array2<f64>) -> Result<Array2<f64>> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(FcsError::SingularSpillover);
    }

    // augmented [A | I]
    let mut work = Array2::zeros((n, 2 * n));
    work.slice_mut(s![.., ..n]).assign(matrix);
    for i in 0..n {
        work[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| work[[a, col]].abs().total_cmp(&work[[b, col]].abs()))
            .ok_or(FcsError::SingularSpillover)?;
        let pivot = work[[pivot_row, col]];
        if !pivot.is_finite() || pivot.abs() < PIVOT_EPSILON {
            return Err(FcsError::SingularSpillover);
        }

        if pivot_row != col {
            for k in 0..2 * n {
                work.swap([pivot_row, k], [col, k]);
            }
        }

        work.row_mut(col).mapv_inplace(|v| v / pivot);
        let pivot_values = work.row(col).to_owned();
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = work[[row, col]];
            if factor != 0.0 {
                work.row_mut(row).scaled_add(-factor, &pivot_values);
            }
        }
    }

    Ok(work.slice(s![.., n..]).to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn events() -> EventColumns {
        EventColumns::new(
            vec!["FSC-A".into(), "FL1-A".into(), "FL2-A".into()],
            vec![
                ColumnData::UInt32(vec![100, 200]),
                ColumnData::Float32(vec![110.0, 20.0]),
                ColumnData::Float32(vec![60.0, 51.0]),
            ],
        )
    }

    fn assert_close(actual: &ColumnData, expected: &[f64]) {
        let ColumnData::Float64(values) = actual else {
            panic!("expected Float64 column, got {:?}", actual);
        };
        for (a, e) in values.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{} != {}", a, e);
        }
    }

    #[test]
    fn inverts_matrix() -> Result<()> {
        let m = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = invert(&m)?;
        let identity = m.dot(&inv);
        for ((i, j), v) in identity.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((v - expected).abs() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let m = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(invert(&m), Err(FcsError::SingularSpillover)));
    }

    #[test]
    fn identity_spillover_keeps_values() -> Result<()> {
        let spill = Spillover::parse("$SPILLOVER", "2,FL1-A,FL2-A,1,0,0,1")?;
        let out = compensate(&events(), &spill)?;
        assert_close(&out.columns[1], &[110.0, 20.0]);
        assert_close(&out.columns[2], &[60.0, 51.0]);
        assert_eq!(out.columns[0], ColumnData::UInt32(vec![100, 200]));
        Ok(())
    }

    #[test]
    fn removes_spillover() -> Result<()> {
        // true signals (100, 50) and (10, 50); FL1 leaks 10% into FL2, FL2 leaks 20% into FL1
        let spill = Spillover::parse("$SPILLOVER", "2,FL1-A,FL2-A,1,0.1,0.2,1")?;
        let out = compensate(&events(), &spill)?;
        assert_close(&out.columns[1], &[100.0, 10.0]);
        assert_close(&out.columns[2], &[50.0, 50.0]);
        Ok(())
    }

    #[test]
    fn unknown_parameter_is_reported() -> Result<()> {
        let spill = Spillover::parse("$SPILLOVER", "1,FL9-A,1")?;
        assert!(matches!(
            compensate(&events(), &spill),
            Err(FcsError::UnknownParameter(name)) if name == "FL9-A"
        ));
        Ok(())
    }
}
