use crate::events::impression::{EventType, Impression};
use crate::logger::{log_message, LogLevel, Logger};
use std::sync::Arc;

const FILE: &str = "dispatcher.rs";

/// Fire-and-forget delivery of single impressions. Each dispatch runs on its
/// own background task; failures are logged and never retried.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    client: reqwest::Client,
    is_development_mode: bool,
}

impl Dispatcher {
    pub(crate) fn new(is_development_mode: bool) -> Dispatcher {
        Dispatcher {
            client: reqwest::Client::new(),
            is_development_mode,
        }
    }

    /// Spawns the HTTP call and returns immediately. In development mode no
    /// network call is made.
    pub(crate) fn dispatch(&self, logger: Arc<dyn Logger>, impression: Impression) {
        if self.is_development_mode {
            return;
        }
        let client = self.client.clone();
        let url = tracking_url(&impression);
        tokio::spawn(async move {
            match client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status();
                    // Always drain the body so the connection is released.
                    let _ = response.text().await;
                    if status.is_success() {
                        log_message(
                            logger.as_ref(),
                            LogLevel::Info,
                            FILE,
                            &format!("impression event sent to VWO: {}", url),
                        );
                    } else {
                        log_message(
                            logger.as_ref(),
                            LogLevel::Error,
                            FILE,
                            &format!(
                                "impression event could not be sent to VWO, status: {}",
                                status
                            ),
                        );
                    }
                }
                Err(err) => {
                    log_message(
                        logger.as_ref(),
                        LogLevel::Error,
                        FILE,
                        &format!("impression event could not be sent to VWO: {}", err),
                    );
                }
            }
        });
    }
}

/// Materializes the impression's query parameters onto its endpoint URL.
pub(crate) fn tracking_url(impression: &Impression) -> String {
    let mut url = format!(
        "{}?random={}&sdk={}&sdk-v={}&ap={}&sId={}&u={}&account_id={}&uId={}",
        impression.url,
        impression.random,
        impression.sdk,
        impression.sdk_v,
        impression.ap,
        impression.sid,
        impression.u,
        impression.account_id,
        impression.uid,
    );
    match impression.event_type {
        EventType::Push => {
            url.push_str(&format!("&tags={}", impression.tags));
        }
        EventType::TrackUser => {
            url.push_str(&format!(
                "&ed={}&experiment_id={}&combination={}",
                impression.ed, impression.experiment_id, impression.combination
            ));
        }
        EventType::TrackGoal => {
            url.push_str(&format!(
                "&experiment_id={}&combination={}&goal_id={}",
                impression.experiment_id, impression.combination, impression.goal_id
            ));
            if !impression.r.is_empty() {
                url.push_str(&format!("&r={}", impression.r));
            }
        }
    }
    url
}
