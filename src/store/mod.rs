pub mod models;
pub mod table;
pub mod upsert;

pub use models::{CustomerRecord, PriceOutcome, QuotationResult, SOURCE_SITE};
pub use table::{load_table, save_table};
pub use upsert::{merge_rows, upsert};
