// src/process/mod.rs

pub mod dimension;
pub mod rows;
pub mod slug;
pub mod table;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use dimension::to_inches;
pub use rows::{DataRow, TableHeader};
pub use slug::slugify;
pub use table::{locate_table, RawTable};

/// The pallet table of one listing page: display labels, their keys, and
/// one row mapping per body row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub labels: Vec<String>,
    pub keys: Vec<String>,
    pub rows: Vec<DataRow>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.rows.is_empty()
    }
}

/// Parse a listing page and normalize its pallet table.
///
/// Never fails: a page without the table yields an empty result.
#[instrument(level = "debug", skip(html), fields(bytes = html.len()))]
pub fn extract_pallet_table(html: &str) -> ExtractionResult {
    let doc = Html::parse_document(html);
    let raw = locate_table(&doc);
    if raw.is_empty() {
        debug!("no pallet table found");
        return ExtractionResult::default();
    }

    let header = TableHeader::from_labels(raw.header);
    let rows: Vec<DataRow> = raw
        .body
        .iter()
        .map(|cells| header.assemble_row(cells.as_slice()))
        .collect();

    debug!(
        columns = header.keys.len(),
        rows = rows.len(),
        "extracted pallet table"
    );

    ExtractionResult {
        labels: header.labels,
        keys: header.keys,
        rows,
    }
}
