use crate::constants;
use crate::errors::VwoError;
use crate::events::impression::{Impression, MinifiedEvent};
use crate::logger::{log_message, LogLevel, Logger};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Duration, Instant};

const FILE: &str = "batch_queue.rs";

pub type FlushCallback = Arc<dyn Fn(Option<&VwoError>, &[MinifiedEvent]) + Send + Sync>;

/// Knobs for the batching pipeline. Values outside the supported bounds are
/// replaced with defaults at init time, with a warning.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub events_per_request: usize,
    /// Seconds between time-triggered flushes.
    pub request_time_interval: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            events_per_request: constants::BATCH_DEFAULT_EVENTS_PER_REQUEST,
            request_time_interval: constants::BATCH_DEFAULT_REQUEST_INTERVAL,
        }
    }
}

/// Everything the flush path needs, cloned into the worker task once.
pub(crate) struct BatchContext {
    pub account_id: i32,
    pub sdk_key: String,
    /// Scheme-qualified endpoint base, e.g. `https://<data location>`.
    pub base_url: String,
    pub is_development_mode: bool,
    pub usage_stats: Vec<(&'static str, &'static str)>,
    pub logger: Arc<dyn Logger>,
    pub flush_callback: Option<FlushCallback>,
}

enum BatchMessage {
    Event(Impression),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Bounded-batch impression queue. Producers hand impressions over a
/// channel; a single worker owns the buffer and flushes it when the batch
/// size is reached, the interval elapses, or shutdown is requested.
pub(crate) struct BatchEventQueue {
    tx: mpsc::UnboundedSender<BatchMessage>,
    pending: Arc<AtomicUsize>,
}

impl BatchEventQueue {
    pub(crate) fn new(config: BatchConfig, context: BatchContext) -> BatchEventQueue {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        tokio::spawn(run_worker(rx, config, context, pending.clone()));
        BatchEventQueue { tx, pending }
    }

    /// FIFO within a single producer; returns false when the worker is gone.
    pub(crate) fn enqueue(&self, impression: Impression) -> bool {
        self.tx.send(BatchMessage::Event(impression)).is_ok()
    }

    /// Flushes whatever is buffered and waits for the attempt to finish.
    /// The queue keeps running.
    pub(crate) async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(BatchMessage::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Final flush, then the worker terminates. Further enqueues are dropped.
    pub(crate) async fn shutdown(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(BatchMessage::Shutdown(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Number of impressions currently buffered by the worker.
    pub(crate) fn pending_events(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<BatchMessage>,
    config: BatchConfig,
    context: BatchContext,
    pending: Arc<AtomicUsize>,
) {
    let client = reqwest::Client::new();
    let interval = Duration::from_secs(config.request_time_interval);
    let mut impressions: Vec<Impression> = Vec::new();
    let mut deadline = Instant::now() + interval;

    loop {
        tokio::select! {
            message = rx.recv() => match message {
                Some(BatchMessage::Event(impression)) => {
                    impressions.push(impression);
                    pending.store(impressions.len(), Ordering::SeqCst);
                    deadline = Instant::now() + interval;
                    if impressions.len() >= config.events_per_request {
                        flush_batch(&client, &context, &mut impressions, &pending).await;
                        deadline = Instant::now() + interval;
                    }
                }
                Some(BatchMessage::Flush(ack)) => {
                    flush_batch(&client, &context, &mut impressions, &pending).await;
                    deadline = Instant::now() + interval;
                    let _ = ack.send(());
                }
                Some(BatchMessage::Shutdown(ack)) => {
                    flush_batch(&client, &context, &mut impressions, &pending).await;
                    let _ = ack.send(());
                    return;
                }
                None => {
                    flush_batch(&client, &context, &mut impressions, &pending).await;
                    return;
                }
            },
            _ = sleep_until(deadline) => {
                flush_batch(&client, &context, &mut impressions, &pending).await;
                deadline = Instant::now() + interval;
            }
        }
    }
}

/// POSTs the buffered impressions as one minified batch. The buffer is
/// cleared whatever the outcome; the registered callback observes the
/// minified events and the error, if any.
async fn flush_batch(
    client: &reqwest::Client,
    context: &BatchContext,
    impressions: &mut Vec<Impression>,
    pending: &AtomicUsize,
) {
    if impressions.is_empty() {
        return;
    }
    let batch_size = impressions.len();
    let events: Vec<MinifiedEvent> = impressions
        .iter()
        .map(|impression| impression.minify(&context.sdk_key))
        .collect();
    impressions.clear();
    pending.store(0, Ordering::SeqCst);

    if context.is_development_mode {
        return;
    }

    let logger = context.logger.as_ref();
    log_message(
        logger,
        LogLevel::Debug,
        FILE,
        &format!(
            "sending batch of {} impression(s) for account: {}",
            batch_size, context.account_id
        ),
    );

    let url = format!("{}{}", context.base_url, constants::ENDPOINT_BATCH_EVENTS);
    let mut query: Vec<(&str, String)> = vec![
        ("a", context.account_id.to_string()),
        ("sd", constants::SDK_NAME.to_string()),
        ("sv", constants::SDK_VERSION.to_string()),
        ("env", context.sdk_key.clone()),
    ];
    for (key, value) in &context.usage_stats {
        query.push((key, value.to_string()));
    }

    let response = client
        .post(&url)
        .query(&query)
        .header("Authorization", &context.sdk_key)
        .json(&serde_json::json!({ "ev": events }))
        .send()
        .await;

    let error = match response {
        Ok(response) => {
            let status = response.status();
            let _ = response.text().await;
            match status.as_u16() {
                200 => {
                    log_message(
                        logger,
                        LogLevel::Info,
                        FILE,
                        &format!(
                            "impression event - batch of {} sent to VWO: {}",
                            batch_size,
                            constants::ENDPOINT_BATCH_EVENTS
                        ),
                    );
                    None
                }
                413 => {
                    let details = format!(
                        "payload too large for {}: reduce eventsPerRequest, currently {}",
                        constants::ENDPOINT_BATCH_EVENTS,
                        batch_size
                    );
                    log_message(logger, LogLevel::Debug, FILE, &details);
                    Some(VwoError::NetworkFailure { details })
                }
                400 => {
                    let details = format!(
                        "batch impression failed for {}: status 400",
                        constants::ENDPOINT_BATCH_EVENTS
                    );
                    log_message(logger, LogLevel::Error, FILE, &details);
                    Some(VwoError::NetworkFailure { details })
                }
                other => {
                    let details = format!(
                        "batch impression failed for {}: status {}",
                        constants::ENDPOINT_BATCH_EVENTS,
                        other
                    );
                    log_message(logger, LogLevel::Error, FILE, &details);
                    Some(VwoError::NetworkFailure { details })
                }
            }
        }
        Err(err) => {
            let details = format!("error while flushing batch: {}", err);
            log_message(logger, LogLevel::Error, FILE, &details);
            Some(VwoError::NetworkFailure { details })
        }
    };

    if let Some(callback) = &context.flush_callback {
        callback(error.as_ref(), &events);
    }
}
