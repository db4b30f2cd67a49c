use crate::error::ChartError;
use crate::error::ResultMessage;
use crate::spreadsheet::cell::Cell;
use crate::table::Grid;
use crate::table::Scalar;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Cells read from one sheet of a workbook, in document order.
pub struct Sheet {
    /// Source file name
    pub file_name: String,
    /// Sheet name
    pub name: String,
    pub(crate) cells: Vec<Cell>,
    /// Used column range, `None` until the first cell arrives
    pub(crate) col_lower_bound: Option<usize>,
    pub(crate) col_upper_bound: Option<usize>,
}

impl Sheet {
    pub(crate) fn new(file_name: &str, name: &str) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            cells: Vec::new(),
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    /// Returns true if the sheet contains no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn push(&mut self, cell: Cell) {
        let col = cell.col;
        if self.col_lower_bound.map(|bound| col < bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
        if self.col_upper_bound.map(|bound| bound < col).unwrap_or(true) {
            self.col_upper_bound = Some(col);
        }
        self.cells.push(cell);
    }

    /// Populated rows keyed by physical row index. Each row spans the used
    /// column range; rows without any cell are absent.
    pub fn physical_rows(&self) -> Result<BTreeMap<usize, Vec<Scalar>>, ChartError> {
        match (self.col_lower_bound, self.col_upper_bound) {
            (Some(lower), Some(upper)) => self.rows_over(&(lower..=upper).collect::<Vec<_>>()),
            _ => Ok(BTreeMap::new()),
        }
    }

    /// The sheet as a grid with fully empty rows and columns removed.
    pub fn grid(&self) -> Result<Grid, ChartError> {
        let mut columns: Vec<usize> = self.cells.iter().map(|cell| cell.col).collect();
        columns.sort_unstable();
        columns.dedup();
        Ok(Grid::compact(self.rows_over(&columns)?.into_values().collect()))
    }

    fn rows_over(&self, columns: &[usize]) -> Result<BTreeMap<usize, Vec<Scalar>>, ChartError> {
        let positions: HashMap<usize, usize> = columns
            .iter()
            .enumerate()
            .map(|(position, &col)| (col, position))
            .collect();
        let mut rows = BTreeMap::new();
        for cell in &self.cells {
            let Some(&position) = positions.get(&cell.col) else {
                continue;
            };
            let value = cell
                .to_scalar()
                .with_prefix(&format!("{}!{}", self.name, cell.reference()))?;
            rows.entry(cell.row)
                .or_insert_with(|| vec![Scalar::Null; columns.len()])[position] = value;
        }
        Ok(rows)
    }
}
