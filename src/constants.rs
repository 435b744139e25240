pub const MAX_TRAFFIC_PERCENT: f64 = 100.0;
pub const MAX_TRAFFIC_VALUE: i32 = 10000;
pub const STATUS_RUNNING: &str = "RUNNING";
pub const SDK_NAME: &str = "vwo-rust-sdk";
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PLATFORM: &str = "server";
pub const SEED_VALUE: u32 = 1;

pub const GOAL_IDENTIFIER_SEPARATOR: &str = "_vwo_";

pub const PUSH_API_TAG_KEY_LENGTH: usize = 255;
pub const PUSH_API_TAG_VALUE_LENGTH: usize = 255;

pub const VWO_USER_ID_KEY: &str = "_vwo_user_id";
pub const VWO_NAMESPACE_URL: &str = "https://vwo.com";

pub const HTTPS_PROTOCOL: &str = "https://";
pub const BASE_URL: &str = "dev.visualwebsiteoptimizer.com";
pub const ENDPOINT_SETTINGS: &str = "/server-side/settings";
pub const ENDPOINT_TRACK_USER: &str = "/server-side/track-user";
pub const ENDPOINT_TRACK_GOAL: &str = "/server-side/track-goal";
pub const ENDPOINT_PUSH: &str = "/server-side/push";
pub const ENDPOINT_BATCH_EVENTS: &str = "/server-side/batch-events";

// Operand wrappers understood by the segment evaluator.
pub const LOWER_MATCH: &str = r"^lower\((.*)\)";
pub const WILDCARD_MATCH: &str = r"^wildcard\((.*)\)";
pub const REGEX_MATCH: &str = r"^regex\((.*)\)";
pub const STARTING_STAR: &str = r"^\*";
pub const ENDING_STAR: &str = r"\*$";

pub const BATCH_MIN_EVENTS_PER_REQUEST: usize = 1;
pub const BATCH_MAX_EVENTS_PER_REQUEST: usize = 5000;
pub const BATCH_MIN_REQUEST_INTERVAL: u64 = 1;
pub const BATCH_DEFAULT_EVENTS_PER_REQUEST: usize = 100;
pub const BATCH_DEFAULT_REQUEST_INTERVAL: u64 = 600;

pub const CAMPAIGN_DECISION_TYPE: &str = "CAMPAIGN_DECISION";
