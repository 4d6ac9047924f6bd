pub mod batch;

pub use batch::{run_quotation_process, BatchRunner};
