pub mod api;
pub mod bucketing;
pub mod constants;
pub mod decider;
pub mod errors;
pub mod events;
pub mod integrations;
pub mod logger;
pub mod segmentation;
pub mod settings;
pub mod storage;
pub mod value;

#[cfg(test)]
pub(crate) mod testdata;

pub use api::{CampaignKeys, Vwo, VwoBuilder};
pub use decider::Options;
pub use errors::VwoError;
pub use events::{BatchConfig, FlushCallback, MinifiedEvent};
pub use integrations::{DecisionRecord, Integrations};
pub use logger::{DefaultLogger, LogLevel, Logger};
pub use settings::{get_settings_file, CampaignType, GoalType, SettingsFile};
pub use storage::{UserData, UserStorage};
pub use value::Value;
