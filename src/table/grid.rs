use crate::table::scalar::Scalar;

/// Rectangular matrix of raw values with no header interpretation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Scalar>>,
    width: usize,
}

impl Grid {
    /// Builds a grid from ragged rows, dropping every row and every column
    /// that holds only missing values. Remaining rows and columns keep their
    /// relative order and are re-indexed from zero.
    pub fn compact(rows: Vec<Vec<Scalar>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let kept_cols: Vec<usize> = (0..width)
            .filter(|&col| {
                rows.iter()
                    .any(|row| row.get(col).map(|value| !value.is_null()).unwrap_or(false))
            })
            .collect();

        let rows: Vec<Vec<Scalar>> = rows
            .into_iter()
            .filter(|row| row.iter().any(|value| !value.is_null()))
            .map(|row| {
                kept_cols
                    .iter()
                    .map(|&col| row.get(col).cloned().unwrap_or_default().normalized())
                    .collect()
            })
            .collect();

        Grid {
            width: if rows.is_empty() { 0 } else { kept_cols.len() },
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Scalar> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }
}
