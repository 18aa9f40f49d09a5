//! Domain models
//!
//! Plain serde structs mirroring the SQLite tables. `sqlx` derives are
//! feature-gated behind `db` so client-side code can use the same types.

pub mod address;
pub mod cart;
pub mod menu;
pub mod order;
pub mod promo_code;
pub mod serde_helpers;

pub use address::DeliveryAddress;
pub use cart::{Cart, CartLine, CartLineDetail};
pub use menu::{AddOnGroup, AddOnOption, MenuItem, OptionPrice, ProductVariation, SelectionMode, VariationOption};
pub use order::{Order, OrderLine, OrderStatus, PaymentMethod, PaymentStatus};
pub use promo_code::PromoCode;
