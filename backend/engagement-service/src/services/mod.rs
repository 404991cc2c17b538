pub mod feed;
pub mod stats;
pub mod toggle;

pub use feed::{FeedQueryPlanner, VideoListingParams};
pub use stats::AggregationEngine;
pub use toggle::{ToggleCoordinator, ToggleOutcome};
