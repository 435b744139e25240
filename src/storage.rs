use crate::errors::VwoError;

/// Record shape persisted per (user, campaign) pair. An all-empty record is
/// treated as a miss.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserData {
    pub user_id: String,
    pub campaign_key: String,
    pub variation_name: String,
    pub goal_identifier: String,
}

impl UserData {
    pub fn is_empty(&self) -> bool {
        self.variation_name.is_empty()
    }
}

/// Sticky-bucketing capability. Implementations are called from whatever task
/// invoked the public API and must be internally safe; any error they return
/// degrades to a storage miss and the decision continues.
pub trait UserStorage: Send + Sync {
    fn get(&self, user_id: &str, campaign_key: &str) -> Result<UserData, VwoError>;

    fn set(
        &self,
        user_id: &str,
        campaign_key: &str,
        variation_name: &str,
        goal_identifier: &str,
    ) -> Result<(), VwoError>;
}
