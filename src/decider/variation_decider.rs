use crate::bucketing;
use crate::constants;
use crate::decider::Options;
use crate::errors::VwoError;
use crate::events::uuid::generate_for;
use crate::integrations::{DecisionRecord, Integrations};
use crate::logger::{log_message, LogLevel, Logger};
use crate::segmentation::evaluate;
use crate::settings::{Campaign, SettingsFile, Variation};
use crate::storage::UserStorage;
use crate::value::{Attributes, Value};

const FILE: &str = "variation_decider.rs";

/// Outcome of a successful decision.
#[derive(Debug, Clone)]
pub struct DecidedVariation {
    pub variation: Variation,
    /// Goal identifiers already tracked for this (user, campaign), straight
    /// from user storage; empty when freshly bucketed.
    pub stored_goal_identifier: String,
}

/// Borrowed view of everything a decision needs. The decider never owns the
/// settings document.
pub(crate) struct Decider<'a> {
    pub settings_file: &'a SettingsFile,
    pub user_storage: Option<&'a dyn UserStorage>,
    pub logger: &'a dyn Logger,
    pub integrations: &'a Integrations,
    pub api: &'static str,
}

impl<'a> Decider<'a> {
    /// Resolves the variation for a user in a campaign.
    ///
    /// The pipeline short-circuits in order: whitelisting, user storage,
    /// traffic inclusion, then either mutually-exclusive-group arbitration
    /// or plain pre-segmentation, and finally deterministic bucketing.
    ///
    /// Returns `Ok(None)` when a group decision quietly goes to another
    /// campaign (no error, no impression); `Err` when the user is excluded.
    pub(crate) fn get_variation(
        &self,
        user_id: &str,
        campaign: &Campaign,
        goal_identifier: &str,
        options: &Options,
    ) -> Result<Option<DecidedVariation>, VwoError> {
        let mut targeting = options.variation_targeting_variables.clone();
        targeting
            .entry(constants::VWO_USER_ID_KEY.to_string())
            .or_insert_with(|| Value::String(user_id.to_string()));

        let mut record = self.build_decision_record(user_id, campaign, goal_identifier, options, &targeting);

        // 1. Whitelisting.
        if let Some(targeted_variation) = self.find_targeted_variation(user_id, campaign, &targeting) {
            log_message(
                self.logger,
                LogLevel::Info,
                FILE,
                &format!(
                    "user ID: {} of campaign: {} got forced-variation: {}",
                    user_id, campaign.key, targeted_variation.name
                ),
            );
            self.integrations
                .execute(&mut record, false, campaign, &targeted_variation, true);
            return Ok(Some(DecidedVariation {
                variation: targeted_variation,
                stored_goal_identifier: String::new(),
            }));
        }

        // 2. User storage.
        let (stored_variation_name, stored_goal_identifier) =
            self.get_variation_from_user_storage(user_id, campaign);
        if let Some(variation_name) = stored_variation_name {
            log_message(
                self.logger,
                LogLevel::Info,
                FILE,
                &format!(
                    "got stored variation: {} of campaign: {} for user ID: {}",
                    variation_name, campaign.key, user_id
                ),
            );
            let variation = campaign.get_variation(&variation_name)?.clone();
            self.integrations
                .execute(&mut record, true, campaign, &variation, false);
            return Ok(Some(DecidedVariation {
                variation,
                stored_goal_identifier,
            }));
        }

        // 3. Traffic inclusion.
        if !bucketing::is_user_part_of_campaign(self.logger, user_id, campaign) {
            return Err(VwoError::no_variation(
                user_id,
                &campaign.key,
                "user did not become part of the campaign",
            ));
        }

        let passes_presegmentation = self.evaluate_presegmentation(user_id, campaign, options);

        // 4. Mutually exclusive group arbitration.
        if let Some(group_id) = self.settings_file.get_group_id(campaign.id) {
            if passes_presegmentation {
                let group_campaigns = self.settings_file.get_group_campaigns(group_id);
                if !group_campaigns.is_empty() {
                    if self.is_any_group_campaign_whitelisted_or_stored(
                        user_id,
                        campaign,
                        &group_campaigns,
                        &targeting,
                    ) {
                        log_message(
                            self.logger,
                            LogLevel::Info,
                            FILE,
                            &format!(
                                "no decision for user ID: {} in campaign: {}, another campaign of group: {} is whitelisted or stored",
                                user_id, campaign.key, group_id
                            ),
                        );
                        return Ok(None);
                    }

                    let eligible =
                        self.get_eligible_campaigns(user_id, campaign, &group_campaigns, options);
                    log_message(
                        self.logger,
                        LogLevel::Debug,
                        FILE,
                        &format!(
                            "eligible campaigns of group: {} for user ID: {}: [{}]",
                            group_id,
                            user_id,
                            eligible
                                .iter()
                                .map(|c| c.key.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    );

                    match find_winner_campaign(user_id, eligible) {
                        Some(winner) if winner.id == campaign.id => {
                            log_message(
                                self.logger,
                                LogLevel::Info,
                                FILE,
                                &format!(
                                    "campaign: {} is the winner of group: {} for user ID: {}",
                                    campaign.key, group_id, user_id
                                ),
                            );
                        }
                        _ => {
                            log_message(
                                self.logger,
                                LogLevel::Info,
                                FILE,
                                &format!(
                                    "campaign: {} did not win group: {} for user ID: {}",
                                    campaign.key, group_id, user_id
                                ),
                            );
                            return Ok(None);
                        }
                    }
                    return self
                        .bucket_and_store(user_id, campaign, goal_identifier, &mut record)
                        .map(Some);
                }
            }
        }

        // 5 & 6. Pre-segmentation gate, then bucket-to-variation.
        if passes_presegmentation {
            return self
                .bucket_and_store(user_id, campaign, goal_identifier, &mut record)
                .map(Some);
        }

        Err(VwoError::no_variation(
            user_id,
            &campaign.key,
            "pre-segmentation failed",
        ))
    }

    /// Whitelisting: collects the variations whose targeting segments match,
    /// then picks one directly (single match) or by bucketing over the
    /// rescaled candidate set.
    fn find_targeted_variation(
        &self,
        user_id: &str,
        campaign: &Campaign,
        targeting: &Attributes,
    ) -> Option<Variation> {
        if !campaign.is_forced_variation {
            log_message(
                self.logger,
                LogLevel::Debug,
                FILE,
                &format!(
                    "whitelisting is not used for campaign: {}, skipping it for user ID: {}",
                    campaign.key, user_id
                ),
            );
            return None;
        }

        let mut white_listed: Vec<Variation> = Vec::new();
        for variation in &campaign.variations {
            let segments = match &variation.segments {
                Some(segments) => segments,
                None => {
                    log_message(
                        self.logger,
                        LogLevel::Debug,
                        FILE,
                        &format!(
                            "for user ID: {} of campaign: {} segments are missing for variation: {}, skipping whitelisting for it",
                            user_id, campaign.key, variation.name
                        ),
                    );
                    continue;
                }
            };
            if evaluate(segments, targeting) {
                white_listed.push(variation.clone());
            }
        }

        match white_listed.len() {
            0 => None,
            1 => Some(white_listed.remove(0)),
            _ => {
                bucketing::scale_variations(&mut white_listed);
                bucketing::set_variation_allocation_ranges(&mut white_listed);
                let (_, bucket_value) = bucketing::get_bucket_value_for_user(
                    user_id,
                    campaign,
                    f64::from(constants::MAX_TRAFFIC_VALUE),
                    1.0,
                );
                let variation =
                    bucketing::get_bucketer_variation(&white_listed, bucket_value).cloned();
                if variation.is_none() {
                    log_message(
                        self.logger,
                        LogLevel::Info,
                        FILE,
                        &format!(
                            "no whitelisted variation found for user ID: {} of campaign: {} with bucket value: {}",
                            user_id, campaign.key, bucket_value
                        ),
                    );
                }
                variation
            }
        }
    }

    /// User-storage lookup. Any storage failure degrades to a miss so the
    /// decision can continue.
    fn get_variation_from_user_storage(
        &self,
        user_id: &str,
        campaign: &Campaign,
    ) -> (Option<String>, String) {
        let storage = match self.user_storage {
            Some(storage) => storage,
            None => {
                log_message(
                    self.logger,
                    LogLevel::Debug,
                    FILE,
                    "no user storage service to get data",
                );
                return (None, String::new());
            }
        };
        match storage.get(user_id, &campaign.key) {
            Ok(user_data) => {
                if user_data.is_empty() {
                    log_message(
                        self.logger,
                        LogLevel::Debug,
                        FILE,
                        &format!(
                            "no stored variation for user ID: {} of campaign: {}",
                            user_id, campaign.key
                        ),
                    );
                    (None, String::new())
                } else {
                    (
                        Some(user_data.variation_name),
                        user_data.goal_identifier,
                    )
                }
            }
            Err(err) => {
                log_message(
                    self.logger,
                    LogLevel::Error,
                    FILE,
                    &format!(
                        "getting data from user storage failed for user ID: {}: {}",
                        user_id, err
                    ),
                );
                (None, String::new())
            }
        }
    }

    fn evaluate_presegmentation(
        &self,
        user_id: &str,
        campaign: &Campaign,
        options: &Options,
    ) -> bool {
        let segments = match &campaign.segments {
            Some(segments) => segments,
            None => {
                log_message(
                    self.logger,
                    LogLevel::Debug,
                    FILE,
                    &format!(
                        "for user ID: {} of campaign: {} segments are missing, skipping pre-segmentation",
                        user_id, campaign.key
                    ),
                );
                return true;
            }
        };
        let status = evaluate(segments, &options.custom_variables);
        log_message(
            self.logger,
            LogLevel::Info,
            FILE,
            &format!(
                "pre-segmentation for user ID: {} of campaign: {} evaluated to: {}",
                user_id, campaign.key, status
            ),
        );
        status
    }

    /// Group rule: if any *other* campaign of the group already owns the
    /// user through whitelisting or storage, the whole call yields no
    /// decision.
    fn is_any_group_campaign_whitelisted_or_stored(
        &self,
        user_id: &str,
        called_campaign: &Campaign,
        group_campaigns: &[&Campaign],
        targeting: &Attributes,
    ) -> bool {
        for campaign in group_campaigns {
            if campaign.id == called_campaign.id {
                continue;
            }
            if self
                .find_targeted_variation(user_id, campaign, targeting)
                .is_some()
            {
                return true;
            }
        }
        for campaign in group_campaigns {
            if campaign.id == called_campaign.id {
                continue;
            }
            let (stored, _) = self.get_variation_from_user_storage(user_id, campaign);
            if stored.is_some() {
                return true;
            }
        }
        false
    }

    /// Campaigns of the group competing for this user: each one passes its
    /// own pre-segmentation and traffic allocation; the called campaign is
    /// always in.
    fn get_eligible_campaigns(
        &self,
        user_id: &str,
        called_campaign: &Campaign,
        group_campaigns: &[&Campaign],
        options: &Options,
    ) -> Vec<Campaign> {
        let mut eligible: Vec<Campaign> = Vec::new();
        for campaign in group_campaigns {
            if campaign.id == called_campaign.id {
                eligible.push((*campaign).clone());
                continue;
            }
            let passes_segments = match &campaign.segments {
                Some(segments) => evaluate(segments, &options.custom_variables),
                None => true,
            };
            if passes_segments && bucketing::is_user_part_of_campaign(self.logger, user_id, campaign)
            {
                eligible.push((*campaign).clone());
            }
        }
        eligible
    }

    fn bucket_and_store(
        &self,
        user_id: &str,
        campaign: &Campaign,
        goal_identifier: &str,
        record: &mut DecisionRecord,
    ) -> Result<DecidedVariation, VwoError> {
        let variation = bucketing::bucket_user_to_variation(self.logger, user_id, campaign)?;

        match self.user_storage {
            Some(storage) => {
                if let Err(err) =
                    storage.set(user_id, &campaign.key, &variation.name, goal_identifier)
                {
                    log_message(
                        self.logger,
                        LogLevel::Error,
                        FILE,
                        &format!(
                            "saving data into user storage failed for user ID: {}: {}",
                            user_id, err
                        ),
                    );
                } else {
                    log_message(
                        self.logger,
                        LogLevel::Info,
                        FILE,
                        &format!("setting data into user storage for user ID: {}", user_id),
                    );
                }
            }
            None => {
                log_message(
                    self.logger,
                    LogLevel::Debug,
                    FILE,
                    "no user storage service to set data",
                );
            }
        }

        log_message(
            self.logger,
            LogLevel::Info,
            FILE,
            &format!(
                "user ID: {} of campaign: {} got variation: {}",
                user_id, campaign.key, variation.name
            ),
        );
        self.integrations
            .execute(record, false, campaign, &variation, false);
        Ok(DecidedVariation {
            variation,
            stored_goal_identifier: String::new(),
        })
    }

    fn build_decision_record(
        &self,
        user_id: &str,
        campaign: &Campaign,
        goal_identifier: &str,
        options: &Options,
        targeting: &Attributes,
    ) -> DecisionRecord {
        let group_id = self.settings_file.get_group_id(campaign.id);
        let group_name =
            group_id.and_then(|id| self.settings_file.get_group_name(id).map(str::to_string));
        DecisionRecord {
            campaign_id: campaign.id,
            campaign_key: campaign.key.clone(),
            campaign_type: campaign.campaign_type.to_string(),
            custom_variables: options.custom_variables.clone(),
            event: constants::CAMPAIGN_DECISION_TYPE.to_string(),
            goal_identifier: goal_identifier.to_string(),
            is_forced_variation_enabled: campaign.is_forced_variation,
            sdk_version: constants::SDK_VERSION.to_string(),
            source: self.api.to_string(),
            user_id: user_id.to_string(),
            variation_targeting_variables: targeting.clone(),
            vwo_user_id: generate_for(user_id, self.settings_file.account_id),
            from_user_storage_service: false,
            is_user_whitelisted: false,
            is_feature_enabled: None,
            variation_name: None,
            variation_id: None,
            group_id,
            group_name,
        }
    }
}

/// Picks the winner of a mutually exclusive group: equal-weight scaling,
/// range derivation over 1..10000, then a campaign-seed-free bucket of the
/// user against those ranges.
pub(crate) fn find_winner_campaign(user_id: &str, mut eligible: Vec<Campaign>) -> Option<Campaign> {
    if eligible.is_empty() {
        return None;
    }
    if eligible.len() == 1 {
        return Some(eligible.remove(0));
    }
    bucketing::scale_campaigns(&mut eligible);
    bucketing::set_campaign_allocation_ranges(&mut eligible);
    let bucket_value = bucketing::get_bucket_value(
        bucketing::hash(user_id),
        f64::from(constants::MAX_TRAFFIC_VALUE),
        1.0,
    );
    bucketing::get_campaign_using_range(&eligible, bucket_value).cloned()
}
