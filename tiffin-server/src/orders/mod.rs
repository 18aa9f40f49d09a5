//! Order lifecycle: pure state machine, actor capability checks, status
//! services, cancellation/refund coordination and reorders.

pub mod actor;
pub mod cancel;
pub mod reorder;
pub mod service;
pub mod state_machine;

pub use actor::Actor;
pub use cancel::{CancellationOutcome, cancel_order};
pub use reorder::{ReorderOutcome, reorder};
pub use state_machine::TransitionError;
