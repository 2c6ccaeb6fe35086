//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use domain::Money;
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

/// Currency used for every payment intent.
pub const CURRENCY: &str = "usd";

/// A pending charge created with the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Secret the client uses to confirm the charge.
    pub client_secret: String,
    pub amount: Money,
    pub currency: String,
}

/// Trait for the external payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent for `amount` in `currency`.
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
    ) -> Result<PaymentIntent, WorkflowError>;
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    intents: HashMap<String, PaymentIntent>,
    next_id: u32,
    fail_on_intent: bool,
}

/// In-memory payment gateway for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to decline intent creation.
    pub fn set_fail_on_intent(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_intent = fail;
    }

    /// Returns the number of intents created so far.
    pub fn intent_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .intents
            .len()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn create_intent(
        &self,
        amount: Money,
        currency: &str,
    ) -> Result<PaymentIntent, WorkflowError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_intent {
            return Err(WorkflowError::PaymentGateway(
                "Payment intent declined".to_string(),
            ));
        }

        state.next_id += 1;
        let id = format!("pi_{:06}", state.next_id);
        let intent = PaymentIntent {
            client_secret: format!("{id}_secret"),
            id: id.clone(),
            amount,
            currency: currency.to_string(),
        };
        state.intents.insert(id, intent.clone());

        Ok(intent)
    }
}
