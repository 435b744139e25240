use crate::api::validate::validate_get_feature_variable_value;
use crate::api::Vwo;
use crate::decider::Options;
use crate::errors::VwoError;
use crate::logger::{log_message, LogLevel};
use crate::settings::CampaignType;
use crate::value::Value;

const FILE: &str = "get_feature_variable_value.rs";
const API: &str = "GetFeatureVariableValue";

impl Vwo {
    /// Value of a feature variable for the user. Rollout campaigns declare
    /// variables at the campaign level; feature tests read them from the
    /// assigned variation, falling back to control when the feature is off
    /// for that variation. Returns None when no value applies.
    pub async fn get_feature_variable_value(
        &self,
        campaign_key: &str,
        variable_key: &str,
        user_id: &str,
        options: Option<Options>,
    ) -> Option<Value> {
        let logger = self.logger.as_ref();
        if !validate_get_feature_variable_value(campaign_key, variable_key, user_id) {
            let err = VwoError::InputInvalid {
                api: API,
                details: "campaign key, variable key and user ID are required".to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return None;
        }

        let options = options.unwrap_or_default();
        let campaign = match self.settings_file.get_campaign(campaign_key) {
            Ok(campaign) => campaign,
            Err(err) => {
                log_message(logger, LogLevel::Error, FILE, &err.to_string());
                return None;
            }
        };
        if !campaign.is_running() {
            let err = VwoError::CampaignNotRunning {
                campaign_key: campaign_key.to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return None;
        }
        if campaign.campaign_type == CampaignType::VisualAb {
            let err = VwoError::CampaignTypeMismatch {
                api: API,
                campaign_key: campaign_key.to_string(),
                campaign_type: campaign.campaign_type.to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return None;
        }

        let decided = match self.decider(API).get_variation(user_id, campaign, "", &options) {
            Ok(Some(decided)) => decided,
            Ok(None) => return None,
            Err(err) => {
                log_message(logger, LogLevel::Info, FILE, &err.to_string());
                return None;
            }
        };

        let variable = match campaign.campaign_type {
            CampaignType::FeatureRollout => campaign.get_variable(variable_key),
            CampaignType::FeatureTest => {
                if decided.variation.is_feature_enabled {
                    decided
                        .variation
                        .variables
                        .iter()
                        .find(|variable| variable.key == variable_key)
                } else {
                    log_message(
                        logger,
                        LogLevel::Info,
                        FILE,
                        &format!(
                            "feature is not enabled in variation: {} for user ID: {}, reading variable from Control",
                            decided.variation.name, user_id
                        ),
                    );
                    campaign.get_control_variation().and_then(|control| {
                        control
                            .variables
                            .iter()
                            .find(|variable| variable.key == variable_key)
                    })
                }
            }
            CampaignType::VisualAb => None,
        };

        match variable {
            Some(variable) => {
                log_message(
                    logger,
                    LogLevel::Info,
                    FILE,
                    &format!(
                        "user ID: {} of campaign: {} received variable: {} with value: {}",
                        user_id, campaign_key, variable.key, variable.value
                    ),
                );
                Some(variable.value.clone())
            }
            None => {
                log_message(
                    logger,
                    LogLevel::Error,
                    FILE,
                    &format!(
                        "variable: {} not found for user ID: {} in campaign: {} of type: {}",
                        variable_key, user_id, campaign_key, campaign.campaign_type
                    ),
                );
                None
            }
        }
    }
}
