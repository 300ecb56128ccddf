// src/process/rows.rs

use indexmap::IndexMap;

use super::dimension::to_inches;
use super::slug::slugify;

/// One body row: column key → inches. `None` marks a cell with no digits.
pub type DataRow = IndexMap<String, Option<u64>>;

/// Header labels with their derived keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableHeader {
    pub labels: Vec<String>,
    pub keys: Vec<String>,
    /// Key → column position. Later duplicates overwrite earlier ones.
    /// Rows are joined positionally, so this is informational only.
    pub key_index: IndexMap<String, usize>,
}

impl TableHeader {
    pub fn from_labels(labels: Vec<String>) -> Self {
        let keys: Vec<String> = labels.iter().map(|l| slugify(l)).collect();
        let key_index = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();
        Self {
            labels,
            keys,
            key_index,
        }
    }

    /// Pair the i-th cell with the i-th key. Cells past the last key are
    /// dropped; a short row yields a partial mapping.
    pub fn assemble_row<S: AsRef<str>>(&self, cells: &[S]) -> DataRow {
        let mut row = DataRow::with_capacity(cells.len().min(self.keys.len()));
        for (key, cell) in self.keys.iter().zip(cells) {
            row.insert(key.clone(), to_inches(cell.as_ref()));
        }
        row
    }
}
