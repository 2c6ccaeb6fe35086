//! Multi-entity workflows of the marketplace.
//!
//! Every workflow runs inside a single document store transaction:
//! 1. Place order (inventory decrement + order creation)
//! 2. Record payment (payment creation + order completion)
//! 3. Follow / unfollow shop (follow record + follower count)
//! 4. Delete shop, toggle shop blacklist, delete product category and
//!    delete user, each with its cascade
//!
//! If any step fails, none of the workflow's writes become visible.

pub mod cascades;
pub mod error;
pub mod follows;
pub mod orders;
pub mod runner;
pub mod services;

pub use error::WorkflowError;
pub use orders::{PlaceOrder, RecordPayment};
pub use runner::Workflows;
pub use services::{CURRENCY, InMemoryPaymentGateway, PaymentGateway, PaymentIntent};
