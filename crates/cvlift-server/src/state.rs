//! Application State

use std::sync::Arc;

use cvlift_payments::PaymentGateway;

use crate::config::Config;
use crate::deliverable::DeliverableSource;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment provider access for checkout creation and download gating
    pub gateway: Arc<dyn PaymentGateway>,

    /// Maps a download grant to the file to serve
    pub deliverables: Arc<dyn DeliverableSource>,

    pub config: Arc<Config>,
}
