use crate::settings::{Campaign, CampaignType, Variation};
use crate::value::Attributes;
use serde::Serialize;
use std::sync::Arc;

/// Structured record handed to the integrations callback at every decisive
/// step of the variation pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub campaign_id: i32,
    pub campaign_key: String,
    pub campaign_type: String,
    pub custom_variables: Attributes,
    pub event: String,
    pub goal_identifier: String,
    pub is_forced_variation_enabled: bool,
    pub sdk_version: String,
    pub source: String,
    pub user_id: String,
    pub variation_targeting_variables: Attributes,
    pub vwo_user_id: String,
    pub from_user_storage_service: bool,
    pub is_user_whitelisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_feature_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

pub type IntegrationsCallback = dyn Fn(&DecisionRecord) + Send + Sync;

/// Optional synchronous hook invoked with the final decision state.
#[derive(Clone, Default)]
pub struct Integrations {
    callback: Option<Arc<IntegrationsCallback>>,
}

impl Integrations {
    /// A hook with no callback registered; usable in statics.
    pub const fn none() -> Integrations {
        Integrations { callback: None }
    }

    pub fn new(callback: Arc<IntegrationsCallback>) -> Integrations {
        Integrations {
            callback: Some(callback),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.callback.is_some()
    }

    /// Fills the decision-dependent fields and invokes the callback. Skipped
    /// when no callback is registered or the variation carries no name.
    pub(crate) fn execute(
        &self,
        record: &mut DecisionRecord,
        from_user_storage: bool,
        campaign: &Campaign,
        variation: &Variation,
        is_user_whitelisted: bool,
    ) {
        let callback = match &self.callback {
            Some(callback) => callback,
            None => return,
        };
        if variation.name.is_empty() {
            return;
        }

        record.from_user_storage_service = from_user_storage;
        record.is_user_whitelisted = is_user_whitelisted;
        match campaign.campaign_type {
            CampaignType::FeatureRollout => {
                record.is_feature_enabled = Some(true);
            }
            CampaignType::FeatureTest => {
                record.is_feature_enabled = Some(variation.is_feature_enabled);
                record.variation_name = Some(variation.name.clone());
                record.variation_id = Some(variation.id);
            }
            CampaignType::VisualAb => {
                record.variation_name = Some(variation.name.clone());
                record.variation_id = Some(variation.id);
            }
        }
        callback(record);
    }
}
