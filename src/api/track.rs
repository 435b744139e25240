use crate::api::validate::validate_track;
use crate::api::Vwo;
use crate::constants;
use crate::decider::Options;
use crate::errors::VwoError;
use crate::events::impression::create_impression_tracking_goal;
use crate::logger::{log_message, LogLevel};
use crate::settings::{Campaign, CampaignType, GoalType};
use std::collections::HashMap;

const FILE: &str = "track.rs";
const API: &str = "Track";

/// Which campaigns a track call applies to: one key, an explicit list, or
/// every RUNNING campaign carrying a matching goal.
#[derive(Debug, Clone)]
pub enum CampaignKeys {
    Single(String),
    List(Vec<String>),
    All,
}

impl Vwo {
    /// Marks a goal conversion for the user in the selected campaigns and
    /// reports, per campaign key, whether the conversion was tracked.
    pub async fn track(
        &self,
        campaign_keys: CampaignKeys,
        user_id: &str,
        goal_identifier: &str,
        options: Option<Options>,
    ) -> HashMap<String, bool> {
        let logger = self.logger.as_ref();
        let mut results: HashMap<String, bool> = HashMap::new();
        if !validate_track(user_id, goal_identifier) {
            let err = VwoError::InputInvalid {
                api: API,
                details: "user ID and goal identifier are required".to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return results;
        }

        let options = options.unwrap_or_default();
        let goal_type_to_track = options
            .goal_type_to_track
            .unwrap_or(self.goal_type_to_track);
        let should_track_returning_user = options
            .should_track_returning_user
            .unwrap_or(self.should_track_returning_user);

        let campaigns: Vec<&Campaign> = match &campaign_keys {
            CampaignKeys::Single(key) => match self.settings_file.get_campaign(key) {
                Ok(campaign) => vec![campaign],
                Err(err) => {
                    log_message(logger, LogLevel::Error, FILE, &err.to_string());
                    Vec::new()
                }
            },
            CampaignKeys::List(keys) => {
                let campaigns = self.settings_file.get_campaigns_for_keys(keys);
                if campaigns.len() != keys.len() {
                    log_message(
                        logger,
                        LogLevel::Error,
                        FILE,
                        &format!("some campaign keys of {:?} were not found", keys),
                    );
                }
                campaigns
            }
            CampaignKeys::All => {
                let campaigns = self
                    .settings_file
                    .get_campaigns_for_goal(goal_identifier, goal_type_to_track);
                if campaigns.is_empty() {
                    log_message(
                        logger,
                        LogLevel::Error,
                        FILE,
                        &format!(
                            "no campaign found for goal identifier: {} with goal type to track: {}",
                            goal_identifier, goal_type_to_track
                        ),
                    );
                }
                campaigns
            }
        };

        for campaign in campaigns {
            let tracked = self.track_campaign_goal(
                campaign,
                user_id,
                goal_identifier,
                goal_type_to_track,
                should_track_returning_user,
                &options,
            );
            results.insert(campaign.key.clone(), tracked);
        }
        results
    }

    fn track_campaign_goal(
        &self,
        campaign: &Campaign,
        user_id: &str,
        goal_identifier: &str,
        goal_type_to_track: GoalType,
        should_track_returning_user: bool,
        options: &Options,
    ) -> bool {
        let logger = self.logger.as_ref();
        if !campaign.is_running() {
            let err = VwoError::CampaignNotRunning {
                campaign_key: campaign.key.clone(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return false;
        }
        if campaign.campaign_type == CampaignType::FeatureRollout {
            let err = VwoError::CampaignTypeMismatch {
                api: API,
                campaign_key: campaign.key.clone(),
                campaign_type: campaign.campaign_type.to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return false;
        }

        let goal = match campaign.get_goal(goal_identifier) {
            Some(goal) => goal,
            None => {
                let err = VwoError::GoalNotFound {
                    goal_identifier: goal_identifier.to_string(),
                    campaign_key: campaign.key.clone(),
                };
                log_message(logger, LogLevel::Error, FILE, &err.to_string());
                return false;
            }
        };
        if goal_type_to_track != GoalType::All && goal.goal_type != goal_type_to_track {
            let err = VwoError::GoalTypeMismatch {
                goal_identifier: goal_identifier.to_string(),
                expected: goal_type_to_track.to_string(),
                found: goal.goal_type.to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return false;
        }
        if goal.goal_type == GoalType::Revenue && options.revenue_value.is_none() {
            let err = VwoError::RevenueMissing {
                goal_identifier: goal_identifier.to_string(),
                campaign_key: campaign.key.clone(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return false;
        }

        let decided = match self
            .decider(API)
            .get_variation(user_id, campaign, goal_identifier, options)
        {
            Ok(Some(decided)) => decided,
            Ok(None) => return false,
            Err(err) => {
                log_message(logger, LogLevel::Info, FILE, &err.to_string());
                return false;
            }
        };

        // A goal already recorded for this (user, campaign) is only re-sent
        // when returning-user tracking is on; new goals are appended to the
        // stored identifier list.
        if !decided.stored_goal_identifier.is_empty() {
            let already_tracked = decided
                .stored_goal_identifier
                .split(constants::GOAL_IDENTIFIER_SEPARATOR)
                .any(|identifier| identifier == goal_identifier);
            if already_tracked {
                if !should_track_returning_user {
                    log_message(
                        logger,
                        LogLevel::Info,
                        FILE,
                        &format!(
                            "goal: {} of campaign: {} for user ID: {} has already been tracked, skipping",
                            goal_identifier, campaign.key, user_id
                        ),
                    );
                    return false;
                }
            } else if let Some(storage) = &self.user_storage {
                let updated = format!(
                    "{}{}{}",
                    decided.stored_goal_identifier,
                    constants::GOAL_IDENTIFIER_SEPARATOR,
                    goal_identifier
                );
                if let Err(err) = storage.set(
                    user_id,
                    &campaign.key,
                    &decided.variation.name,
                    &updated,
                ) {
                    log_message(
                        logger,
                        LogLevel::Error,
                        FILE,
                        &format!(
                            "saving data into user storage failed for user ID: {}: {}",
                            user_id, err
                        ),
                    );
                }
            }
        }

        let impression = create_impression_tracking_goal(
            &self.settings_file,
            logger,
            campaign.id,
            decided.variation.id,
            user_id,
            goal.goal_type,
            goal.id,
            options.revenue_value.as_ref(),
        );
        self.send_impression(impression);

        log_message(
            logger,
            LogLevel::Info,
            FILE,
            &format!(
                "track-goal impression for account ID: {}, user ID: {}, campaign ID: {}, variation ID: {}, goal ID: {}",
                self.settings_file.account_id, user_id, campaign.id, decided.variation.id, goal.id
            ),
        );
        true
    }
}
