use crate::constants;
use crate::errors::VwoError;
use crate::settings::SettingsFile;

/// Fetches the settings document for an account and derives the allocation
/// ranges. Refreshing on demand is the caller's concern; the returned file
/// is immutable during decisions.
pub async fn get_settings_file(account_id: &str, sdk_key: &str) -> Result<SettingsFile, VwoError> {
    if account_id.is_empty() {
        return Err(VwoError::SettingsInvalid {
            details: "account ID is required for fetching account settings".to_string(),
        });
    }
    if sdk_key.is_empty() {
        return Err(VwoError::SettingsInvalid {
            details: "SDK key is required for fetching account settings".to_string(),
        });
    }

    let url = format!(
        "{}{}{}",
        constants::HTTPS_PROTOCOL,
        constants::BASE_URL,
        constants::ENDPOINT_SETTINGS
    );
    let cache_buster = rand::random::<f64>().to_string();
    let response = reqwest::Client::new()
        .get(&url)
        .query(&[
            ("a", account_id),
            ("i", sdk_key),
            ("r", cache_buster.as_str()),
            ("platform", constants::PLATFORM),
            ("sdk", constants::SDK_NAME),
            ("sdk-v", constants::SDK_VERSION),
            ("api-version", "1"),
        ])
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(VwoError::NetworkFailure {
            details: format!("settings request returned status {}", status),
        });
    }

    SettingsFile::from_json(&body)
}
