pub mod outcome;
pub mod position;
pub mod result_table;

pub use outcome::{FetchOutcome, PageImage};
pub use position::Position;
pub use result_table::{BatchResults, FailedSet, MergeStats, ResultTable, Slot};
