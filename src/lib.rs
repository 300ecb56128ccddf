// src/lib.rs

pub mod area;
pub mod config;
pub mod fetch;
pub mod process;
pub mod server;

pub use area::{total_square_feet, AreaColumns, PalletItem, PalletSummary};
pub use config::Config;
pub use fetch::{FetchError, PalletFetcher};
pub use process::{extract_pallet_table, slugify, to_inches, DataRow, ExtractionResult};
