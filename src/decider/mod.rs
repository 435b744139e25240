pub mod variation_decider;

#[cfg(test)]
mod variation_decider_tests;

pub use variation_decider::*;

use crate::settings::GoalType;
use crate::value::{Attributes, Value};

/// Per-call options shared by every public entry point.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Attributes evaluated by campaign pre-segmentation.
    pub custom_variables: Attributes,
    /// Attributes evaluated by variation targeting (whitelisting).
    pub variation_targeting_variables: Attributes,
    /// Revenue for revenue goals; accepted as integer, double or string.
    pub revenue_value: Option<Value>,
    /// Overrides the instance-level goal type filter for this call.
    pub goal_type_to_track: Option<GoalType>,
    /// Overrides the instance-level returning-user behavior for this call.
    pub should_track_returning_user: Option<bool>,
}
