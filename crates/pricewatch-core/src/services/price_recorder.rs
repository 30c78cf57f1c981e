//! Reconciles observed prices into the current-price and history tables.
//!
//! This is the only writer of associations and history points. Every
//! observation attempts both upserts; a failed history write is downgraded
//! to a warning and never undoes the association write.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Persistence, PriceObservation};
use crate::ports::PriceStore;

/// The association write failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to record current price: {message}")]
pub struct PersistenceError {
    pub message: String,
    /// Whether the history point was still written.
    pub history_recorded: bool,
}

/// Result of a successful association write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordReceipt {
    /// Set when the history point could not be written.
    pub history_warning: Option<String>,
}

impl RecordReceipt {
    pub fn persistence(&self) -> Persistence {
        self.history_warning
            .clone()
            .map_or(Persistence::Recorded, Persistence::HistoryNotRecorded)
    }
}

/// Idempotent writer for price observations.
#[derive(Clone)]
pub struct PriceRecorder {
    store: Arc<dyn PriceStore>,
}

impl PriceRecorder {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self { store }
    }

    /// Upsert the association, then the history point for the observation's UTC date.
    ///
    /// Recording the same observation twice leaves one association and one
    /// history point. A later observation on the same day overwrites that
    /// day's price; a later day adds a new point.
    pub async fn record(
        &self,
        observation: &PriceObservation,
    ) -> Result<RecordReceipt, PersistenceError> {
        let PriceObservation {
            product_id,
            retailer_id,
            ref url,
            price,
            observed_at,
        } = *observation;
        let observed_on = observation.observed_on();

        let association = self
            .store
            .upsert_association(product_id, retailer_id, price, url, observed_at)
            .await;

        let history = self
            .store
            .upsert_history_point(product_id, retailer_id, observed_on, price, observed_at)
            .await;

        let history_warning = match history {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    product_id,
                    retailer_id,
                    date = %observed_on,
                    error = %e,
                    "Failed to record price history point"
                );
                Some(e.to_string())
            }
        };

        match association {
            Ok(()) => {
                debug!(product_id, retailer_id, price = %price, "Recorded price");
                Ok(RecordReceipt { history_warning })
            }
            Err(e) => {
                warn!(
                    product_id,
                    retailer_id,
                    error = %e,
                    "Failed to record current price"
                );
                Err(PersistenceError {
                    message: e.to_string(),
                    history_recorded: history_warning.is_none(),
                })
            }
        }
    }
}
