//! Shared types for the tiffin marketplace backend
//!
//! Domain models, the selection-set value object, and id/time utilities
//! used by the server (and by future client crates, which is why the
//! persistence derives are feature-gated behind `db`).

pub mod models;
pub mod selection;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use selection::{AddOnChoice, SelectionSet, VariationChoice};
