use thiserror::Error;

/// Error taxonomy for the SDK. Every failure is surfaced through one of these
/// kinds; public entry points log them and degrade to their no-op return.
#[derive(Debug, Error)]
pub enum VwoError {
    #[error("invalid parameters passed to {api}: {details}")]
    InputInvalid { api: &'static str, details: String },

    #[error("campaign key: {campaign_key} not found")]
    CampaignNotFound { campaign_key: String },

    #[error("campaign: {campaign_key} is not RUNNING. Please verify from VWO App")]
    CampaignNotRunning { campaign_key: String },

    #[error("{api} is not valid for campaign: {campaign_key} of type: {campaign_type}")]
    CampaignTypeMismatch {
        api: &'static str,
        campaign_key: String,
        campaign_type: String,
    },

    #[error("goal: {goal_identifier} not found for campaign: {campaign_key}")]
    GoalNotFound {
        goal_identifier: String,
        campaign_key: String,
    },

    #[error("goal type to track is {expected} but goal: {goal_identifier} has type {found}")]
    GoalTypeMismatch {
        goal_identifier: String,
        expected: String,
        found: String,
    },

    #[error("revenue value should be passed for revenue goal: {goal_identifier} of campaign: {campaign_key}")]
    RevenueMissing {
        goal_identifier: String,
        campaign_key: String,
    },

    #[error("user ID: {user_id} of campaign: {campaign_key} did not get any variation: {reason}")]
    NoVariationAllotted {
        user_id: String,
        campaign_key: String,
        reason: String,
    },

    #[error("no variations in campaign: {campaign_key}")]
    NoVariationInCampaign { campaign_key: String },

    #[error("variation: {variation_name} not found in campaign: {campaign_key}")]
    VariationNotFound {
        variation_name: String,
        campaign_key: String,
    },

    #[error("user storage failed for user ID: {user_id}: {details}")]
    StorageUnavailable { user_id: String, details: String },

    #[error("request to VWO endpoint failed: {details}")]
    NetworkFailure { details: String },

    #[error("settings file is not valid: {details}")]
    SettingsInvalid { details: String },

    #[error("invalid configuration, falling back to defaults: {details}")]
    ConfigInvalid { details: String },
}

impl VwoError {
    pub(crate) fn no_variation(user_id: &str, campaign_key: &str, reason: &str) -> VwoError {
        VwoError::NoVariationAllotted {
            user_id: user_id.to_string(),
            campaign_key: campaign_key.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for VwoError {
    fn from(err: reqwest::Error) -> VwoError {
        VwoError::NetworkFailure {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for VwoError {
    fn from(err: serde_json::Error) -> VwoError {
        VwoError::SettingsInvalid {
            details: err.to_string(),
        }
    }
}
