//! Domain models for the event blog API.
//!
//! Records are fixed-shape structs. Except for users, whose password hash
//! never leaves the repository, the stored document and the domain type
//! are the same struct.

pub mod category;
pub mod event;
pub mod product;
pub mod stock;
pub mod user;

pub use category::{Category, NewCategory};
pub use event::{Event, NewEvent};
pub use product::{NewProduct, Product};
pub use stock::{NewStock, Stock};
pub use user::{NewUser, User};
