//! External services used by the workflows.

pub mod payment;

pub use payment::{CURRENCY, InMemoryPaymentGateway, PaymentGateway, PaymentIntent};
