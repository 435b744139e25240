use crate::api::validate::validate_activate;
use crate::api::Vwo;
use crate::decider::Options;
use crate::errors::VwoError;
use crate::events::impression::create_impression_tracking_user;
use crate::logger::{log_message, LogLevel};
use crate::settings::CampaignType;

const FILE: &str = "activate.rs";
const API: &str = "Activate";

impl Vwo {
    /// Resolves the variation for the user in a visual A/B campaign and
    /// sends a track-user impression. Returns the variation name, or the
    /// empty string when no variation is assigned.
    pub async fn activate(
        &self,
        campaign_key: &str,
        user_id: &str,
        options: Option<Options>,
    ) -> String {
        let logger = self.logger.as_ref();
        if !validate_activate(campaign_key, user_id) {
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
        if campaign.campaign_type != CampaignType::VisualAb {
            let err = VwoError::CampaignTypeMismatch {
                api: API,
                campaign_key: campaign_key.to_string(),
                campaign_type: campaign.campaign_type.to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return String::new();
        }

        match self.decider(API).get_variation(user_id, campaign, "", &options) {
            Ok(Some(decided)) => {
                let impression = create_impression_tracking_user(
                    &self.settings_file,
                    logger,
                    campaign.id,
                    decided.variation.id,
                    user_id,
                );
                self.send_impression(impression);
                log_message(
                    logger,
                    LogLevel::Info,
                    FILE,
                    &format!(
                        "track-user impression for account ID: {}, user ID: {}, campaign ID: {}, variation ID: {}",
                        self.settings_file.account_id, user_id, campaign.id, decided.variation.id
                    ),
                );
                decided.variation.name
            }
            Ok(None) => String::new(),
            Err(err) => {
                log_message(logger, LogLevel::Info, FILE, &err.to_string());
                String::new()
            }
        }
    }
}
