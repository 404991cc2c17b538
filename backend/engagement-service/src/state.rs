/// Service composition root state.
///
/// Everything here is constructed once in `main` and injected; in
/// particular the notification hub is an owned instance, not a process
/// global.
use std::sync::Arc;

use crate::notifications::NotificationHub;
use crate::repository::{ContentStore, RelationLedger};
use crate::services::{AggregationEngine, FeedQueryPlanner, ToggleCoordinator};

#[derive(Clone)]
pub struct AppState {
    pub toggles: ToggleCoordinator,
    pub aggregation: AggregationEngine,
    pub feed: FeedQueryPlanner,
    pub hub: NotificationHub,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn RelationLedger>,
        content: Arc<dyn ContentStore>,
        hub: NotificationHub,
    ) -> Self {
        Self {
            toggles: ToggleCoordinator::new(ledger.clone(), content.clone(), hub.clone()),
            aggregation: AggregationEngine::new(ledger, content.clone()),
            feed: FeedQueryPlanner::new(content),
            hub,
        }
    }
}
