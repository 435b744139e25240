use crate::api::validate::validate_is_feature_enabled;
use crate::api::Vwo;
use crate::decider::Options;
use crate::errors::VwoError;
use crate::events::impression::create_impression_tracking_user;
use crate::logger::{log_message, LogLevel};
use crate::settings::CampaignType;

const FILE: &str = "is_feature_enabled.rs";
const API: &str = "IsFeatureEnabled";

impl Vwo {
    /// Whether the feature behind a feature-test or feature-rollout campaign
    /// is enabled for the user. Feature tests send a track-user impression;
    /// rollouts are enabled for every participating user and emit nothing.
    pub async fn is_feature_enabled(
        &self,
        campaign_key: &str,
        user_id: &str,
        options: Option<Options>,
    ) -> bool {
        let logger = self.logger.as_ref();
        if !validate_is_feature_enabled(campaign_key, user_id) {
            let err = VwoError::InputInvalid {
                api: API,
                details: "campaign key and user ID are required".to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return false;
        }

        let options = options.unwrap_or_default();
        let campaign = match self.settings_file.get_campaign(campaign_key) {
            Ok(campaign) => campaign,
            Err(err) => {
                log_message(logger, LogLevel::Error, FILE, &err.to_string());
                return false;
            }
        };
        if !campaign.is_running() {
            let err = VwoError::CampaignNotRunning {
                campaign_key: campaign_key.to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return false;
        }
        if campaign.campaign_type == CampaignType::VisualAb {
            let err = VwoError::CampaignTypeMismatch {
                api: API,
                campaign_key: campaign_key.to_string(),
                campaign_type: campaign.campaign_type.to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return false;
        }

        let decided = match self.decider(API).get_variation(user_id, campaign, "", &options) {
            Ok(Some(decided)) => decided,
            Ok(None) => return false,
            Err(err) => {
                log_message(logger, LogLevel::Info, FILE, &err.to_string());
                return false;
            }
        };

        let is_feature_enabled = match campaign.campaign_type {
            CampaignType::FeatureTest => {
                let impression = create_impression_tracking_user(
                    &self.settings_file,
                    logger,
                    campaign.id,
                    decided.variation.id,
                    user_id,
                );
                self.send_impression(impression);
                decided.variation.is_feature_enabled
            }
            CampaignType::FeatureRollout => true,
            CampaignType::VisualAb => false,
        };

        if is_feature_enabled {
            log_message(
                logger,
                LogLevel::Info,
                FILE,
                &format!(
                    "campaign: {} for user ID: {} is enabled",
                    campaign_key, user_id
                ),
            );
        } else {
            log_message(
                logger,
                LogLevel::Info,
                FILE,
                &format!(
                    "campaign: {} for user ID: {} is not enabled",
                    campaign_key, user_id
                ),
            );
        }
        is_feature_enabled
    }
}
