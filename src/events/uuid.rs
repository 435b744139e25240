use crate::constants;
use uuid::Uuid;

/// Deterministic UUID for a (user, account) pair: a v5 chain rooted in the
/// URL namespace via https://vwo.com, then the account ID, then the user ID.
/// Rendered as hyphen-free uppercase hex.
pub fn generate_for(user_id: &str, account_id: i32) -> String {
    let vwo_namespace = Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        constants::VWO_NAMESPACE_URL.as_bytes(),
    );
    let account_namespace = Uuid::new_v5(&vwo_namespace, account_id.to_string().as_bytes());
    let user_uuid = Uuid::new_v5(&account_namespace, user_id.as_bytes());
    user_uuid.simple().to_string().to_uppercase()
}
