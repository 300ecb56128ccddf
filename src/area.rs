// src/area.rs

use serde::{Deserialize, Serialize};

use crate::process::{DataRow, ExtractionResult};

/// Cubic inches per cubic foot.
pub const CUBIC_INCHES_PER_FOOT: u128 = 1728;

/// Which row keys carry the dimensions and the item count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaColumns {
    pub height: String,
    pub width: String,
    pub length: String,
    pub count: String,
}

impl Default for AreaColumns {
    fn default() -> Self {
        Self {
            height: "height".into(),
            width: "width".into(),
            length: "length".into(),
            count: "pallet".into(),
        }
    }
}

/// One fully dimensioned line of a pallet, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalletItem {
    pub height: u64,
    pub width: u64,
    pub length: u64,
    pub count: u64,
}

impl PalletItem {
    /// `None` if any of the four columns is missing or unparseable.
    pub fn from_row(row: &DataRow, cols: &AreaColumns) -> Option<Self> {
        let get = |key: &str| row.get(key).copied().flatten();
        Some(Self {
            height: get(&cols.height)?,
            width: get(&cols.width)?,
            length: get(&cols.length)?,
            count: get(&cols.count)?,
        })
    }

    pub fn cubic_inches(&self) -> u128 {
        [self.height, self.width, self.length, self.count]
            .iter()
            .fold(1u128, |acc, &v| acc.saturating_mul(v as u128))
    }
}

/// Total footprint of all rows, rounded up to whole feet.
///
/// Rows without a complete set of dimensions are skipped.
pub fn total_square_feet(rows: &[DataRow], cols: &AreaColumns) -> u64 {
    let cubic: u128 = rows
        .iter()
        .filter_map(|row| PalletItem::from_row(row, cols))
        .fold(0u128, |acc, item| acc.saturating_add(item.cubic_inches()));
    u64::try_from(cubic.div_ceil(CUBIC_INCHES_PER_FOOT)).unwrap_or(u64::MAX)
}

/// Per-pallet figures as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletSummary {
    pub pallet_id: String,
    pub items: Vec<PalletItem>,
    pub ft_sq: u64,
}

impl PalletSummary {
    pub fn from_extraction(
        pallet_id: impl Into<String>,
        result: &ExtractionResult,
        cols: &AreaColumns,
    ) -> Self {
        Self {
            pallet_id: pallet_id.into(),
            items: result
                .rows
                .iter()
                .filter_map(|row| PalletItem::from_row(row, cols))
                .collect(),
            ft_sq: total_square_feet(&result.rows, cols),
        }
    }
}

/// Sum of the per-pallet figures; each pallet is rounded on its own first.
pub fn combined_square_feet(summaries: &[PalletSummary]) -> u64 {
    summaries
        .iter()
        .fold(0u64, |acc, s| acc.saturating_add(s.ft_sq))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Option<u64>)]) -> DataRow {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_single_row() {
        let rows = vec![row(&[
            ("height", Some(60)),
            ("width", Some(48)),
            ("length", Some(120)),
            ("pallet", Some(2)),
        ])];
        assert_eq!(total_square_feet(&rows, &AreaColumns::default()), 400);
    }

    #[test]
    fn test_rounds_up() {
        let rows = vec![row(&[
            ("height", Some(1)),
            ("width", Some(1)),
            ("length", Some(1)),
            ("pallet", Some(1)),
        ])];
        assert_eq!(total_square_feet(&rows, &AreaColumns::default()), 1);
        assert_eq!(total_square_feet(&[], &AreaColumns::default()), 0);
    }

    #[test]
    fn test_incomplete_rows_are_skipped() {
        let rows = vec![
            row(&[("height", Some(12)), ("width", Some(12)), ("length", Some(12))]),
            row(&[
                ("height", None),
                ("width", Some(12)),
                ("length", Some(12)),
                ("pallet", Some(1)),
            ]),
            row(&[
                ("height", Some(12)),
                ("width", Some(12)),
                ("length", Some(24)),
                ("pallet", Some(3)),
            ]),
        ];
        assert_eq!(total_square_feet(&rows, &AreaColumns::default()), 6);
    }

    #[test]
    fn test_custom_count_column() {
        let cols = AreaColumns {
            count: "qty".into(),
            ..AreaColumns::default()
        };
        let rows = vec![row(&[
            ("height", Some(12)),
            ("width", Some(12)),
            ("length", Some(12)),
            ("qty", Some(5)),
        ])];
        assert_eq!(total_square_feet(&rows, &cols), 5);
        assert_eq!(total_square_feet(&rows, &AreaColumns::default()), 0);
    }

    #[test]
    fn test_summary_and_combined_total() {
        let result = ExtractionResult {
            labels: vec![],
            keys: vec![],
            rows: vec![row(&[
                ("height", Some(60)),
                ("width", Some(48)),
                ("length", Some(120)),
                ("pallet", Some(2)),
            ])],
        };
        let a = PalletSummary::from_extraction("1001", &result, &AreaColumns::default());
        assert_eq!(a.ft_sq, 400);
        assert_eq!(
            a.items,
            vec![PalletItem {
                height: 60,
                width: 48,
                length: 120,
                count: 2
            }]
        );

        let b = PalletSummary::from_extraction(
            "1002",
            &ExtractionResult::default(),
            &AreaColumns::default(),
        );
        assert_eq!(combined_square_feet(&[a, b]), 400);
    }
}
