use crate::errors::VwoError;
use crate::logger::{LogLevel, Logger};
use crate::segmentation::SegmentNode;
use crate::settings::{
    Campaign, CampaignType, Goal, GoalType, Group, SettingsFile, Variable, Variation,
};
use crate::storage::{UserData, UserStorage};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) const TEST_SDK_KEY: &str = "test-sdk-key";
pub(crate) const TEST_ACCOUNT_ID: i32 = 12345;

// Users with externally known bucket values (maxValue 10000, multiplier 1):
// USER_IN_FIRST_HALF buckets to 4987 unseeded and 8177 with campaign 1 as
// seed; USER_IN_SECOND_HALF buckets to 6361 unseeded and 2444 seeded.
pub(crate) const USER_IN_FIRST_HALF: &str = "1111111111111111";
pub(crate) const USER_IN_SECOND_HALF: &str = "someone@mail.com";

/// Logger that swallows everything; decisions under test do not need a sink.
pub(crate) struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// Logger capturing formatted messages for assertions.
#[derive(Default)]
pub(crate) struct RecordingLogger {
    pub messages: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub(crate) fn contains(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.messages.lock().unwrap().push((level, message.to_string()));
    }
}

/// Map-backed user storage.
#[derive(Default)]
pub(crate) struct InMemoryStorage {
    records: Mutex<HashMap<(String, String), UserData>>,
}

impl InMemoryStorage {
    pub(crate) fn stored(&self, user_id: &str, campaign_key: &str) -> Option<UserData> {
        self.records
            .lock()
            .unwrap()
            .get(&(user_id.to_string(), campaign_key.to_string()))
            .cloned()
    }

    pub(crate) fn seed(&self, user_data: UserData) {
        self.records.lock().unwrap().insert(
            (user_data.user_id.clone(), user_data.campaign_key.clone()),
            user_data,
        );
    }
}

impl UserStorage for InMemoryStorage {
    fn get(&self, user_id: &str, campaign_key: &str) -> Result<UserData, VwoError> {
        Ok(self
            .stored(user_id, campaign_key)
            .unwrap_or_default())
    }

    fn set(
        &self,
        user_id: &str,
        campaign_key: &str,
        variation_name: &str,
        goal_identifier: &str,
    ) -> Result<(), VwoError> {
        self.seed(UserData {
            user_id: user_id.to_string(),
            campaign_key: campaign_key.to_string(),
            variation_name: variation_name.to_string(),
            goal_identifier: goal_identifier.to_string(),
        });
        Ok(())
    }
}

/// Storage whose every call fails; decisions must shrug it off.
pub(crate) struct FailingStorage;

impl UserStorage for FailingStorage {
    fn get(&self, user_id: &str, _campaign_key: &str) -> Result<UserData, VwoError> {
        Err(VwoError::StorageUnavailable {
            user_id: user_id.to_string(),
            details: "backend is down".to_string(),
        })
    }

    fn set(
        &self,
        user_id: &str,
        _campaign_key: &str,
        _variation_name: &str,
        _goal_identifier: &str,
    ) -> Result<(), VwoError> {
        Err(VwoError::StorageUnavailable {
            user_id: user_id.to_string(),
            details: "backend is down".to_string(),
        })
    }
}

pub(crate) fn variation(id: i32, name: &str, weight: f64) -> Variation {
    Variation {
        id,
        name: name.to_string(),
        weight,
        ..Default::default()
    }
}

pub(crate) fn default_goals() -> Vec<Goal> {
    vec![
        Goal {
            id: 201,
            identifier: "GOAL_1".to_string(),
            goal_type: GoalType::Custom,
        },
        Goal {
            id: 202,
            identifier: "REVENUE_GOAL".to_string(),
            goal_type: GoalType::Revenue,
        },
    ]
}

fn base_settings(campaigns: Vec<Campaign>) -> SettingsFile {
    let mut settings_file = SettingsFile {
        account_id: TEST_ACCOUNT_ID,
        sdk_key: TEST_SDK_KEY.to_string(),
        collection_prefix: String::new(),
        campaigns,
        groups: HashMap::new(),
        campaign_groups: HashMap::new(),
    };
    settings_file.process();
    settings_file
}

pub(crate) fn ab_campaign(id: i32, key: &str, percent_traffic: i32, weights: &[f64]) -> Campaign {
    let variations = weights
        .iter()
        .enumerate()
        .map(|(index, weight)| {
            let name = if index == 0 {
                "Control".to_string()
            } else {
                format!("Variation-{}", index)
            };
            variation(index as i32 + 1, &name, *weight)
        })
        .collect();
    Campaign {
        id,
        key: key.to_string(),
        campaign_type: CampaignType::VisualAb,
        status: "RUNNING".to_string(),
        percent_traffic,
        goals: default_goals(),
        variations,
        ..Default::default()
    }
}

/// Visual A/B campaign, two variations at 50/50.
pub(crate) fn settings_ab_50_50(percent_traffic: i32) -> SettingsFile {
    base_settings(vec![ab_campaign(
        231,
        "AB_T_100_W_50_50",
        percent_traffic,
        &[50.0, 50.0],
    )])
}

pub(crate) fn settings_ab_33_33_33() -> SettingsFile {
    base_settings(vec![ab_campaign(
        232,
        "AB_T_100_W_33_33_33",
        100,
        &[33.3333, 33.3333, 33.3333],
    )])
}

/// Campaign 1 with the bucketing seed enabled: hash keys become "1_<user>".
pub(crate) fn settings_ab_with_seed() -> SettingsFile {
    let mut campaign = ab_campaign(1, "AB_T_100_W_50_50_SEED", 100, &[50.0, 50.0]);
    campaign.is_bucketing_seed_enabled = true;
    base_settings(vec![campaign])
}

/// Whitelisting fixture: forced variations enabled, Variation-1 targeted at
/// the user "Ashley".
pub(crate) fn settings_ab_whitelisting() -> SettingsFile {
    let mut campaign = ab_campaign(233, "AB_T_100_W_50_50_WS", 100, &[50.0, 50.0]);
    campaign.is_forced_variation = true;
    campaign.variations[1].segments = Some(SegmentNode::User("Ashley".to_string()));
    base_settings(vec![campaign])
}

/// Campaign gated by pre-segmentation on a custom variable a == "b".
pub(crate) fn settings_ab_with_presegmentation() -> SettingsFile {
    let mut campaign = ab_campaign(234, "AB_T_100_W_50_50_PS", 100, &[50.0, 50.0]);
    campaign.segments = Some(SegmentNode::CustomVariable(HashMap::from([(
        "a".to_string(),
        Value::String("b".to_string()),
    )])));
    base_settings(vec![campaign])
}

pub(crate) fn rollout_variables() -> Vec<Variable> {
    vec![
        Variable {
            id: 1,
            key: "STRING_VARIABLE".to_string(),
            variable_type: "string".to_string(),
            value: Value::String("this_is_a_string".to_string()),
        },
        Variable {
            id: 2,
            key: "INTEGER_VARIABLE".to_string(),
            variable_type: "integer".to_string(),
            value: Value::Integer(123),
        },
        Variable {
            id: 3,
            key: "FLOAT_VARIABLE".to_string(),
            variable_type: "double".to_string(),
            value: Value::Double(10.14),
        },
        Variable {
            id: 4,
            key: "BOOLEAN_VARIABLE".to_string(),
            variable_type: "boolean".to_string(),
            value: Value::Boolean(true),
        },
    ]
}

/// Feature rollout at 100% traffic with campaign-level variables.
pub(crate) fn settings_feature_rollout() -> SettingsFile {
    let campaign = Campaign {
        id: 29,
        key: "FR_T_100_W_100".to_string(),
        campaign_type: CampaignType::FeatureRollout,
        status: "RUNNING".to_string(),
        percent_traffic: 100,
        goals: vec![Goal {
            id: 203,
            identifier: "FEATURE_GOAL".to_string(),
            goal_type: GoalType::Custom,
        }],
        variations: vec![variation(1, "website-variation", 100.0)],
        variables: rollout_variables(),
        ..Default::default()
    };
    base_settings(vec![campaign])
}

/// Feature test with four variations at 10/20/30/40; the feature is off in
/// Control and Variation-3.
pub(crate) fn settings_feature_test() -> SettingsFile {
    let variable = |value: &str| {
        vec![Variable {
            id: 1,
            key: "STRING_VARIABLE".to_string(),
            variable_type: "string".to_string(),
            value: Value::String(value.to_string()),
        }]
    };
    let mut control = variation(1, "Control", 10.0);
    control.is_feature_enabled = false;
    control.variables = variable("Control string");
    let mut variation_1 = variation(2, "Variation-1", 20.0);
    variation_1.is_feature_enabled = true;
    variation_1.variables = variable("Variation-1 string");
    let mut variation_2 = variation(3, "Variation-2", 30.0);
    variation_2.is_feature_enabled = true;
    variation_2.variables = variable("Variation-2 string");
    let mut variation_3 = variation(4, "Variation-3", 40.0);
    variation_3.is_feature_enabled = false;
    variation_3.variables = variable("Variation-3 string");

    let campaign = Campaign {
        id: 22,
        key: "FT_T_100_W_10_20_30_40".to_string(),
        campaign_type: CampaignType::FeatureTest,
        status: "RUNNING".to_string(),
        percent_traffic: 100,
        goals: default_goals(),
        variations: vec![control, variation_1, variation_2, variation_3],
        ..Default::default()
    };
    base_settings(vec![campaign])
}

/// Two visual A/B campaigns competing in one mutually exclusive group.
pub(crate) fn settings_two_campaigns_in_group() -> SettingsFile {
    let campaign_1 = ab_campaign(1, "GROUP_CAMPAIGN_1", 100, &[50.0, 50.0]);
    let campaign_2 = ab_campaign(2, "GROUP_CAMPAIGN_2", 100, &[50.0, 50.0]);
    let mut settings_file = base_settings(vec![campaign_1, campaign_2]);
    settings_file.groups.insert(
        "1".to_string(),
        Group {
            name: "first-group".to_string(),
            campaigns: vec![1, 2],
        },
    );
    settings_file
        .campaign_groups
        .insert("1".to_string(), 1);
    settings_file
        .campaign_groups
        .insert("2".to_string(), 1);
    settings_file
}

/// Two independent visual A/B campaigns sharing the same goal identifiers.
pub(crate) fn settings_two_ab_campaigns() -> SettingsFile {
    base_settings(vec![
        ab_campaign(41, "AB_FIRST", 100, &[50.0, 50.0]),
        ab_campaign(42, "AB_SECOND", 100, &[50.0, 50.0]),
    ])
}

/// Paused campaign; every public operation must refuse it.
pub(crate) fn settings_not_running() -> SettingsFile {
    let mut campaign = ab_campaign(235, "AB_PAUSED", 100, &[50.0, 50.0]);
    campaign.status = "PAUSED".to_string();
    base_settings(vec![campaign])
}
