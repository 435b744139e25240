use crate::constants;

pub(crate) fn validate_activate(campaign_key: &str, user_id: &str) -> bool {
    !campaign_key.is_empty() && !user_id.is_empty()
}

pub(crate) fn validate_get_variation_name(campaign_key: &str, user_id: &str) -> bool {
    !campaign_key.is_empty() && !user_id.is_empty()
}

pub(crate) fn validate_is_feature_enabled(campaign_key: &str, user_id: &str) -> bool {
    !campaign_key.is_empty() && !user_id.is_empty()
}

pub(crate) fn validate_get_feature_variable_value(
    campaign_key: &str,
    variable_key: &str,
    user_id: &str,
) -> bool {
    !campaign_key.is_empty() && !variable_key.is_empty() && !user_id.is_empty()
}

pub(crate) fn validate_track(user_id: &str, goal_identifier: &str) -> bool {
    !user_id.is_empty() && !goal_identifier.is_empty()
}

/// Tag identifiers are limited to 255 bytes on the wire.
pub(crate) fn validate_push(tag_key: &str, tag_value: &str, user_id: &str) -> bool {
    !tag_key.is_empty()
        && !tag_value.is_empty()
        && !user_id.is_empty()
        && tag_key.len() <= constants::PUSH_API_TAG_KEY_LENGTH
        && tag_value.len() <= constants::PUSH_API_TAG_VALUE_LENGTH
}
