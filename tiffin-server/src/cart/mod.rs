//! Cart domain: aggregation, selection validation and the signature merge
//! primitive shared by add-to-cart and reorder.

pub mod aggregator;
pub mod merge;
pub mod validate;

pub use aggregator::{CartTotals, PricedLine, aggregate};
pub use merge::{MergeOutcome, merge_line};
