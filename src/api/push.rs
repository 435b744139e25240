use crate::api::validate::validate_push;
use crate::api::Vwo;
use crate::errors::VwoError;
use crate::events::impression::create_impression_for_push;
use crate::logger::{log_message, LogLevel};

const FILE: &str = "push.rs";
const API: &str = "Push";

impl Vwo {
    /// Pushes one custom tag key/value pair for the user. Returns true once
    /// the impression has been handed to the dispatch pipeline.
    pub async fn push(&self, tag_key: &str, tag_value: &str, user_id: &str) -> bool {
        let logger = self.logger.as_ref();
        if !validate_push(tag_key, tag_value, user_id) {
            let err = VwoError::InputInvalid {
                api: API,
                details:
                    "tag key, tag value and user ID are required, tags are limited to 255 characters"
                        .to_string(),
            };
            log_message(logger, LogLevel::Error, FILE, &err.to_string());
            return false;
        }

        let impression = create_impression_for_push(
            &self.settings_file,
            logger,
            tag_key,
            tag_value,
            user_id,
        );
        self.send_impression(impression);

        log_message(
            logger,
            LogLevel::Info,
            FILE,
            &format!(
                "push impression for account ID: {}, user ID: {}, tags: ({}: {})",
                self.settings_file.account_id, user_id, tag_key, tag_value
            ),
        );
        true
    }
}
