use crate::api::validate::validate_get_variation_name;
use crate::api::Vwo;
use crate::decider::Options;
use crate::errors::VwoError;
use crate::logger::{log_message, LogLevel};
use crate::settings::CampaignType;

const FILE: &str = "get_variation_name.rs";
const API: &str = "GetVariationName";

impl Vwo {
    /// Same decision pipeline as activate, without emitting an impression.
    /// Returns the empty string when no variation is assigned.
    pub async fn get_variation_name(
        &self,
        campaign_key: &str,
        user_id: &str,
        options: Option<Options>,
    ) -> String {
        let logger = self.logger.as_ref();
        if !validate_get_variation_name(campaign_key, user_id) {
            let err = VwoError::InputInvalid {
                api: API,
                details: "campaign key and user ID are required".to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return String::new();
        }

        let options = options.unwrap_or_default();
        let campaign = match self.settings_file.get_campaign(campaign_key) {
            Ok(campaign) => campaign,
            Err(err) => {
                log_message(logger, LogLevel::Error, FILE, &err.to_string());
                return String::new();
            }
        };
        if !campaign.is_running() {
            let err = VwoError::CampaignNotRunning {
                campaign_key: campaign_key.to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return String::new();
        }
        if campaign.campaign_type == CampaignType::FeatureRollout {
            let err = VwoError::CampaignTypeMismatch {
                api: API,
                campaign_key: campaign_key.to_string(),
                campaign_type: campaign.campaign_type.to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return String::new();
        }

        match self.decider(API).get_variation(user_id, campaign, "", &options) {
            Ok(Some(decided)) => decided.variation.name,
            Ok(None) => String::new(),
            Err(err) => {
                log_message(logger, LogLevel::Info, FILE, &err.to_string());
                String::new()
            }
        }
    }
}
