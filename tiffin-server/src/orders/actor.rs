//! Actor capability checks
//!
//! Who may drive a transition is decided here, before the state machine is
//! consulted; the machine itself stays pure and role-agnostic.

use shared::models::Order;

use crate::utils::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Customer(i64),
    Restaurant(i64),
}

impl Actor {
    /// The order must belong to the acting party.
    pub fn ensure_owns(&self, order: &Order) -> Result<(), AppError> {
        match self {
            Actor::Customer(id) if order.customer_id == *id => Ok(()),
            Actor::Restaurant(id) if order.restaurant_id == *id => Ok(()),
            Actor::Customer(_) => {
                Err(AppError::ownership("order does not belong to this customer"))
            }
            Actor::Restaurant(_) => {
                Err(AppError::ownership("order does not belong to this restaurant"))
            }
        }
    }
}
