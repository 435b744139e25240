use crate::bucketing;
use crate::constants;
use crate::errors::VwoError;
use crate::segmentation::{deserialize_segments, SegmentNode};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignType {
    #[serde(rename = "VISUAL_AB")]
    VisualAb,
    #[serde(rename = "FEATURE_TEST")]
    FeatureTest,
    #[serde(rename = "FEATURE_ROLLOUT")]
    FeatureRollout,
}

impl Default for CampaignType {
    fn default() -> Self {
        CampaignType::VisualAb
    }
}

impl fmt::Display for CampaignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CampaignType::VisualAb => "VISUAL_AB",
            CampaignType::FeatureTest => "FEATURE_TEST",
            CampaignType::FeatureRollout => "FEATURE_ROLLOUT",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalType {
    #[serde(rename = "REVENUE_TRACKING")]
    Revenue,
    #[serde(rename = "CUSTOM_GOAL")]
    Custom,
    #[serde(rename = "ALL")]
    All,
}

impl Default for GoalType {
    fn default() -> Self {
        GoalType::Custom
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalType::Revenue => "REVENUE_TRACKING",
            GoalType::Custom => "CUSTOM_GOAL",
            GoalType::All => "ALL",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Goal {
    pub id: i32,
    pub identifier: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Variable {
    pub id: i32,
    pub key: String,
    #[serde(rename = "type")]
    pub variable_type: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Variation {
    pub id: i32,
    pub name: String,
    pub weight: f64,
    #[serde(deserialize_with = "deserialize_segments")]
    pub segments: Option<SegmentNode>,
    pub is_feature_enabled: bool,
    pub variables: Vec<Variable>,
    #[serde(skip)]
    pub start_variation_allocation: i32,
    #[serde(skip)]
    pub end_variation_allocation: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Campaign {
    pub id: i32,
    pub key: String,
    #[serde(rename = "type")]
    pub campaign_type: CampaignType,
    pub status: String,
    pub percent_traffic: i32,
    #[serde(rename = "isForcedVariationEnabled")]
    pub is_forced_variation: bool,
    pub is_bucketing_seed_enabled: bool,
    #[serde(deserialize_with = "deserialize_segments")]
    pub segments: Option<SegmentNode>,
    pub goals: Vec<Goal>,
    pub variations: Vec<Variation>,
    pub variables: Vec<Variable>,
    // Filled only during mutually-exclusive-group arbitration.
    #[serde(skip)]
    pub weight: f64,
    #[serde(skip)]
    pub min_range: i32,
    #[serde(skip)]
    pub max_range: i32,
}

impl Campaign {
    pub fn is_running(&self) -> bool {
        self.status == constants::STATUS_RUNNING
    }

    pub fn get_goal(&self, goal_identifier: &str) -> Option<&Goal> {
        self.goals
            .iter()
            .find(|goal| goal.identifier == goal_identifier)
    }

    pub fn get_variation(&self, variation_name: &str) -> Result<&Variation, VwoError> {
        if self.variations.is_empty() {
            return Err(VwoError::NoVariationInCampaign {
                campaign_key: self.key.clone(),
            });
        }
        self.variations
            .iter()
            .find(|variation| variation.name == variation_name)
            .ok_or_else(|| VwoError::VariationNotFound {
                variation_name: variation_name.to_string(),
                campaign_key: self.key.clone(),
            })
    }

    /// Control is the variation with id 1 by convention.
    pub fn get_control_variation(&self) -> Option<&Variation> {
        self.variations.iter().find(|variation| variation.id == 1)
    }

    /// Rollout campaigns declare variables at the campaign level.
    pub fn get_variable(&self, variable_key: &str) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|variable| variable.key == variable_key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    pub name: String,
    pub campaigns: Vec<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    #[serde(rename = "accountId")]
    pub account_id: i32,
    #[serde(rename = "sdkKey")]
    pub sdk_key: String,
    #[serde(rename = "collectionPrefix")]
    pub collection_prefix: String,
    pub campaigns: Vec<Campaign>,
    /// group id -> group metadata
    pub groups: HashMap<String, Group>,
    /// campaign id -> group id, the inverse index of `groups`
    #[serde(rename = "campaignGroups")]
    pub campaign_groups: HashMap<String, i32>,
}

impl SettingsFile {
    /// Parses a settings document and derives the variation allocation
    /// ranges, leaving the file ready for decisions.
    pub fn from_json(raw: &str) -> Result<SettingsFile, VwoError> {
        let mut settings_file: SettingsFile = serde_json::from_str(raw)?;
        settings_file.process();
        Ok(settings_file)
    }

    /// Derives the per-variation allocation ranges. Runs once after load;
    /// the file is immutable during decisions.
    pub fn process(&mut self) {
        for campaign in &mut self.campaigns {
            bucketing::set_variation_allocation_ranges(&mut campaign.variations);
        }
    }

    pub fn get_campaign(&self, campaign_key: &str) -> Result<&Campaign, VwoError> {
        self.campaigns
            .iter()
            .find(|campaign| campaign.key == campaign_key)
            .ok_or_else(|| VwoError::CampaignNotFound {
                campaign_key: campaign_key.to_string(),
            })
    }

    /// Campaigns matching any of the given keys, in settings order. Missing
    /// keys are skipped; the caller logs them.
    pub fn get_campaigns_for_keys(&self, campaign_keys: &[String]) -> Vec<&Campaign> {
        campaign_keys
            .iter()
            .filter_map(|key| self.get_campaign(key).ok())
            .collect()
    }

    /// Every campaign containing a goal with the given identifier whose type
    /// matches `goal_type_to_track` (ALL matches everything).
    pub fn get_campaigns_for_goal(
        &self,
        goal_identifier: &str,
        goal_type_to_track: GoalType,
    ) -> Vec<&Campaign> {
        self.campaigns
            .iter()
            .filter(|campaign| match campaign.get_goal(goal_identifier) {
                Some(goal) => {
                    goal_type_to_track == GoalType::All || goal.goal_type == goal_type_to_track
                }
                None => false,
            })
            .collect()
    }

    pub fn is_part_of_group(&self, campaign_id: i32) -> bool {
        self.campaign_groups
            .contains_key(&campaign_id.to_string())
    }

    pub fn get_group_id(&self, campaign_id: i32) -> Option<i32> {
        self.campaign_groups
            .get(&campaign_id.to_string())
            .copied()
    }

    pub fn get_group_name(&self, group_id: i32) -> Option<&str> {
        self.groups
            .get(&group_id.to_string())
            .map(|group| group.name.as_str())
    }

    /// RUNNING campaigns of the group, in settings order.
    pub fn get_group_campaigns(&self, group_id: i32) -> Vec<&Campaign> {
        let group_campaign_ids: Vec<i32> = self
            .campaign_groups
            .iter()
            .filter(|(_, gid)| **gid == group_id)
            .filter_map(|(campaign_id, _)| campaign_id.parse().ok())
            .collect();

        self.campaigns
            .iter()
            .filter(|campaign| group_campaign_ids.contains(&campaign.id) && campaign.is_running())
            .collect()
    }

    /// Endpoint host, suffixed with the collection prefix when the account
    /// is pinned to a data location.
    pub fn data_location(&self) -> String {
        if self.collection_prefix.is_empty() {
            constants::BASE_URL.to_string()
        } else {
            format!("{}/{}", constants::BASE_URL, self.collection_prefix)
        }
    }
}
