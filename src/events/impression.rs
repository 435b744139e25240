use crate::constants;
use crate::events::uuid::generate_for;
use crate::logger::{log_message, LogLevel, Logger};
use crate::settings::{GoalType, SettingsFile};
use crate::value::Value;
use serde::Serialize;
use url::form_urlencoded;

const FILE: &str = "impression.rs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    TrackUser,
    TrackGoal,
    Push,
}

impl EventType {
    /// Numeric code used by the minified batch payload.
    pub fn code(&self) -> u8 {
        match self {
            EventType::TrackUser => 1,
            EventType::TrackGoal => 2,
            EventType::Push => 3,
        }
    }
}

/// One telemetry record, alive until dispatched or flushed. Field names
/// mirror the wire query parameters.
#[derive(Debug, Clone, Serialize)]
pub struct Impression {
    #[serde(rename = "account_id")]
    pub account_id: i32,
    /// URL-escaped user ID.
    #[serde(rename = "uId")]
    pub uid: String,
    pub random: f64,
    /// Unix-seconds timestamp, stringified.
    #[serde(rename = "sId")]
    pub sid: String,
    /// Deterministic per-(user, account) UUID.
    pub u: String,
    pub sdk: String,
    #[serde(rename = "sdk-v")]
    pub sdk_v: String,
    pub ap: String,
    pub url: String,
    #[serde(rename = "experiment_id")]
    pub experiment_id: i32,
    pub combination: i32,
    pub ed: String,
    #[serde(rename = "goal_id")]
    pub goal_id: i32,
    pub r: String,
    pub tags: String,
    #[serde(skip)]
    pub event_type: EventType,
}

/// Minified shape used by the batch-events payload; only the fields relevant
/// to the event type are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinifiedEvent {
    pub u: String,
    #[serde(rename = "sId")]
    pub s_id: i64,
    #[serde(rename = "eT")]
    pub e_t: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub g: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    pub env: String,
}

impl Impression {
    pub(crate) fn minify(&self, sdk_key: &str) -> MinifiedEvent {
        let mut event = MinifiedEvent {
            u: self.u.clone(),
            s_id: self.sid.parse().unwrap_or(0),
            e_t: self.event_type.code(),
            e: None,
            c: None,
            g: None,
            r: None,
            t: None,
            env: sdk_key.to_string(),
        };
        match self.event_type {
            EventType::TrackUser => {
                event.e = Some(self.experiment_id);
                event.c = Some(self.combination);
            }
            EventType::TrackGoal => {
                event.e = Some(self.experiment_id);
                event.c = Some(self.combination);
                event.g = Some(self.goal_id);
                if !self.r.is_empty() {
                    event.r = Some(self.r.clone());
                }
            }
            EventType::Push => {
                event.t = Some(self.tags.clone());
            }
        }
        event
    }
}

fn url_escape(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Params shared by every impression variant.
fn get_common_properties(settings_file: &SettingsFile, user_id: &str) -> Impression {
    Impression {
        account_id: settings_file.account_id,
        uid: url_escape(user_id),
        random: rand::random(),
        sid: chrono::Utc::now().timestamp().to_string(),
        u: generate_for(user_id, settings_file.account_id),
        sdk: constants::SDK_NAME.to_string(),
        sdk_v: constants::SDK_VERSION.to_string(),
        ap: constants::PLATFORM.to_string(),
        url: String::new(),
        experiment_id: 0,
        combination: 0,
        ed: String::new(),
        goal_id: 0,
        r: String::new(),
        tags: String::new(),
        event_type: EventType::TrackUser,
    }
}

/// Impression marking a user's entry into a campaign variation.
pub fn create_impression_tracking_user(
    settings_file: &SettingsFile,
    logger: &dyn Logger,
    campaign_id: i32,
    variation_id: i32,
    user_id: &str,
) -> Impression {
    let mut impression = get_common_properties(settings_file, user_id);
    impression.event_type = EventType::TrackUser;
    impression.experiment_id = campaign_id;
    impression.combination = variation_id;
    impression.ed = format!(r#"{{"p":"{}"}}"#, constants::PLATFORM);
    impression.url = format!(
        "{}{}{}",
        constants::HTTPS_PROTOCOL,
        settings_file.data_location(),
        constants::ENDPOINT_TRACK_USER
    );

    log_message(
        logger,
        LogLevel::Debug,
        FILE,
        &format!(
            "impression built for track user - account ID: {}, user ID: {}, experiment ID: {}, combination: {}",
            impression.account_id, user_id, impression.experiment_id, impression.combination
        ),
    );

    impression
}

/// Impression marking a goal conversion; revenue goals carry the revenue
/// value in its minimal string form.
pub fn create_impression_tracking_goal(
    settings_file: &SettingsFile,
    logger: &dyn Logger,
    campaign_id: i32,
    variation_id: i32,
    user_id: &str,
    goal_type: GoalType,
    goal_id: i32,
    revenue_value: Option<&Value>,
) -> Impression {
    let mut impression = get_common_properties(settings_file, user_id);
    impression.event_type = EventType::TrackGoal;
    impression.experiment_id = campaign_id;
    impression.combination = variation_id;
    impression.goal_id = goal_id;
    impression.url = format!(
        "{}{}{}",
        constants::HTTPS_PROTOCOL,
        settings_file.data_location(),
        constants::ENDPOINT_TRACK_GOAL
    );

    if goal_type == GoalType::Revenue {
        if let Some(revenue) = revenue_value {
            impression.r = revenue.canonical_string();
        }
    }

    log_message(
        logger,
        LogLevel::Debug,
        FILE,
        &format!(
            "impression built for track goal - account ID: {}, user ID: {}, experiment ID: {}, combination: {}, goal ID: {}",
            impression.account_id, user_id, impression.experiment_id, impression.combination, impression.goal_id
        ),
    );

    impression
}

/// Impression carrying one URL-escaped tag key/value pair.
pub fn create_impression_for_push(
    settings_file: &SettingsFile,
    logger: &dyn Logger,
    tag_key: &str,
    tag_value: &str,
    user_id: &str,
) -> Impression {
    let mut impression = get_common_properties(settings_file, user_id);
    impression.event_type = EventType::Push;
    impression.tags = format!(
        r#"{{"u":{{"{}":"{}"}}}}"#,
        url_escape(tag_key),
        url_escape(tag_value)
    );
    impression.url = format!(
        "{}{}{}",
        constants::HTTPS_PROTOCOL,
        settings_file.data_location(),
        constants::ENDPOINT_PUSH
    );

    log_message(
        logger,
        LogLevel::Debug,
        FILE,
        &format!(
            "impression built for push - account ID: {}, user ID: {}, tags: {}",
            impression.account_id, user_id, impression.tags
        ),
    );

    impression
}
