use crate::constants;
use crate::decider::Decider;
use crate::errors::VwoError;
use crate::events::batch_queue::{BatchConfig, BatchContext, BatchEventQueue, FlushCallback};
use crate::events::dispatcher::Dispatcher;
use crate::events::impression::Impression;
use crate::integrations::{Integrations, IntegrationsCallback};
use crate::logger::{log_message, DefaultLogger, LogLevel, Logger};
use crate::settings::{GoalType, SettingsFile};
use crate::storage::UserStorage;
use std::sync::Arc;

const FILE: &str = "vwo.rs";

/// A configured SDK instance. Owns the settings document, the plugins and
/// the impression pipeline; decisions borrow from it and never mutate it.
pub struct Vwo {
    pub(crate) settings_file: SettingsFile,
    pub(crate) user_storage: Option<Arc<dyn UserStorage>>,
    pub(crate) logger: Arc<dyn Logger>,
    pub(crate) goal_type_to_track: GoalType,
    pub(crate) should_track_returning_user: bool,
    pub(crate) integrations: Integrations,
    pub(crate) batch_queue: Option<BatchEventQueue>,
    pub(crate) dispatcher: Dispatcher,
}

impl Vwo {
    pub fn builder(settings_file: SettingsFile) -> VwoBuilder {
        VwoBuilder::new(settings_file)
    }

    pub fn settings_file(&self) -> &SettingsFile {
        &self.settings_file
    }

    /// Flushes the batch queue immediately and waits for the attempt to
    /// complete. No-op when batching is disabled.
    pub async fn flush_events(&self) {
        if let Some(queue) = &self.batch_queue {
            queue.flush().await;
        }
    }

    /// Shuts the batch queue down: one final flush, then the worker exits.
    pub async fn close(&self) {
        if let Some(queue) = &self.batch_queue {
            queue.shutdown().await;
        }
    }

    /// Impressions currently buffered by the batch queue.
    pub fn pending_batch_events(&self) -> usize {
        self.batch_queue
            .as_ref()
            .map(|queue| queue.pending_events())
            .unwrap_or(0)
    }

    pub(crate) fn decider(&self, api: &'static str) -> Decider<'_> {
        Decider {
            settings_file: &self.settings_file,
            user_storage: self.user_storage.as_deref(),
            logger: self.logger.as_ref(),
            integrations: &self.integrations,
            api,
        }
    }

    /// Routes an impression to the batch queue when batching is enabled,
    /// otherwise dispatches it on its own task.
    pub(crate) fn send_impression(&self, impression: Impression) {
        match &self.batch_queue {
            Some(queue) => {
                if !queue.enqueue(impression) {
                    log_message(
                        self.logger.as_ref(),
                        LogLevel::Error,
                        FILE,
                        "dropping impression, batch queue is closed",
                    );
                }
            }
            None => self.dispatcher.dispatch(self.logger.clone(), impression),
        }
    }
}

/// Step-by-step configuration of a [`Vwo`] instance.
pub struct VwoBuilder {
    settings_file: SettingsFile,
    user_storage: Option<Arc<dyn UserStorage>>,
    logger: Option<Arc<dyn Logger>>,
    log_level: Option<LogLevel>,
    is_development_mode: bool,
    goal_type_to_track: Option<GoalType>,
    should_track_returning_user: Option<bool>,
    batch_config: Option<BatchConfig>,
    flush_callback: Option<FlushCallback>,
    integrations: Integrations,
}

impl VwoBuilder {
    pub fn new(settings_file: SettingsFile) -> VwoBuilder {
        VwoBuilder {
            settings_file,
            user_storage: None,
            logger: None,
            log_level: None,
            is_development_mode: false,
            goal_type_to_track: None,
            should_track_returning_user: None,
            batch_config: None,
            flush_callback: None,
            integrations: Integrations::default(),
        }
    }

    pub fn with_user_storage(mut self, storage: Arc<dyn UserStorage>) -> VwoBuilder {
        self.user_storage = Some(storage);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> VwoBuilder {
        self.logger = Some(logger);
        self
    }

    /// Minimum level for the built-in logger; ignored when a custom logger
    /// is supplied.
    pub fn with_log_level(mut self, level: LogLevel) -> VwoBuilder {
        self.log_level = Some(level);
        self
    }

    /// Suppresses every network call while keeping decisions observable.
    pub fn with_development_mode(mut self) -> VwoBuilder {
        self.is_development_mode = true;
        self
    }

    /// Instance defaults for the track API.
    pub fn with_goal_attributes(
        mut self,
        goal_type_to_track: GoalType,
        should_track_returning_user: bool,
    ) -> VwoBuilder {
        self.goal_type_to_track = Some(goal_type_to_track);
        self.should_track_returning_user = Some(should_track_returning_user);
        self
    }

    pub fn with_batch_event_queue(mut self, config: BatchConfig) -> VwoBuilder {
        self.batch_config = Some(config);
        self
    }

    pub fn with_flush_callback(mut self, callback: FlushCallback) -> VwoBuilder {
        self.flush_callback = Some(callback);
        self
    }

    pub fn with_integrations_callback(mut self, callback: Arc<IntegrationsCallback>) -> VwoBuilder {
        self.integrations = Integrations::new(callback);
        self
    }

    /// Finalizes the instance. Out-of-range batch settings are replaced with
    /// their defaults and logged; nothing here is fatal because the plugin
    /// capabilities are validated by their traits.
    ///
    /// Requires a running tokio runtime when batching is enabled, since the
    /// batch worker is spawned here.
    pub fn build(mut self) -> Vwo {
        let usage_stats = collect_usage_stats(&self);
        let logger: Arc<dyn Logger> = match self.logger {
            Some(custom) => {
                log_message(custom.as_ref(), LogLevel::Debug, FILE, "custom logger used");
                custom
            }
            None => Arc::new(DefaultLogger::new(
                self.log_level.unwrap_or(LogLevel::Error),
            )),
        };

        // Allocation ranges are derived exactly once, before any decision.
        self.settings_file.process();
        let batch_queue = self.batch_config.map(|config| {
            let config = sanitize_batch_config(config, logger.as_ref());
            BatchEventQueue::new(
                config,
                BatchContext {
                    account_id: self.settings_file.account_id,
                    sdk_key: self.settings_file.sdk_key.clone(),
                    base_url: format!(
                        "{}{}",
                        constants::HTTPS_PROTOCOL,
                        self.settings_file.data_location()
                    ),
                    is_development_mode: self.is_development_mode,
                    usage_stats,
                    logger: logger.clone(),
                    flush_callback: self.flush_callback,
                },
            )
        });

        log_message(
            logger.as_ref(),
            LogLevel::Debug,
            FILE,
            &format!(
                "SDK initialized, development mode is: {}",
                self.is_development_mode
            ),
        );

        Vwo {
            settings_file: self.settings_file,
            user_storage: self.user_storage,
            logger,
            goal_type_to_track: self.goal_type_to_track.unwrap_or(GoalType::All),
            should_track_returning_user: self.should_track_returning_user.unwrap_or(false),
            integrations: self.integrations,
            batch_queue,
            dispatcher: Dispatcher::new(self.is_development_mode),
        }
    }
}

fn sanitize_batch_config(mut config: BatchConfig, logger: &dyn Logger) -> BatchConfig {
    if config.events_per_request < constants::BATCH_MIN_EVENTS_PER_REQUEST
        || config.events_per_request > constants::BATCH_MAX_EVENTS_PER_REQUEST
    {
        let err = VwoError::ConfigInvalid {
            details: format!(
                "eventsPerRequest should be between {} and {}, using {}",
                constants::BATCH_MIN_EVENTS_PER_REQUEST,
                constants::BATCH_MAX_EVENTS_PER_REQUEST,
                constants::BATCH_DEFAULT_EVENTS_PER_REQUEST
            ),
        };
        log_message(logger, LogLevel::Warning, FILE, &err.to_string());
        config.events_per_request = constants::BATCH_DEFAULT_EVENTS_PER_REQUEST;
    }
    if config.request_time_interval < constants::BATCH_MIN_REQUEST_INTERVAL {
        let err = VwoError::ConfigInvalid {
            details: format!(
                "requestTimeInterval should be at least {} second(s), using {}",
                constants::BATCH_MIN_REQUEST_INTERVAL,
                constants::BATCH_DEFAULT_REQUEST_INTERVAL
            ),
        };
        log_message(logger, LogLevel::Warning, FILE, &err.to_string());
        config.request_time_interval = constants::BATCH_DEFAULT_REQUEST_INTERVAL;
    }
    config
}

/// Flags describing which optional capabilities are in use; attached to
/// batch-flush requests.
fn collect_usage_stats(builder: &VwoBuilder) -> Vec<(&'static str, &'static str)> {
    let mut stats: Vec<(&'static str, &'static str)> = Vec::new();
    if builder.integrations.is_enabled() {
        stats.push(("ig", "1"));
    }
    if builder.batch_config.is_some() {
        stats.push(("eb", "1"));
    }
    if builder.logger.is_some() {
        stats.push(("cl", "1"));
    }
    if builder.user_storage.is_some() {
        stats.push(("ss", "1"));
    }
    if builder.log_level.is_some() {
        stats.push(("ll", "1"));
    }
    if builder.should_track_returning_user.is_some() {
        stats.push(("tr", "1"));
    }
    if builder.goal_type_to_track.is_some() {
        stats.push(("gt", "1"));
    }
    stats.push(("_l", "1"));
    stats
}
