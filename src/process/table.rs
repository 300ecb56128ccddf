// src/process/table.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static TABLE_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.data").expect("table selector"));
static HEADER_ROW_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr.header").expect("header row selector"));
static BODY_ROW_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr:not(.header)").expect("body row selector"));
static CELL_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("cell selector"));

/// Raw cell text of the pallet table, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub body: Vec<Vec<String>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.body.is_empty()
    }
}

fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.select(&CELL_SEL)
        .map(|td| td.text().collect::<String>())
        .collect()
}

/// Find the first `table.data` and split it into its `tr.header` row and
/// every other row, in document order.
///
/// A page without the table gives an empty `RawTable`; a table without a
/// header row gives body rows with no header.
pub fn locate_table(doc: &Html) -> RawTable {
    let Some(table) = doc.select(&TABLE_SEL).next() else {
        return RawTable::default();
    };

    let header = table
        .select(&HEADER_ROW_SEL)
        .next()
        .map(cell_texts)
        .unwrap_or_default();

    let body = table.select(&BODY_ROW_SEL).map(cell_texts).collect();

    RawTable { header, body }
}
