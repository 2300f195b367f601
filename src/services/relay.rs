//! Notification relay
//!
//! Listens on the backend websocket and turns its frames into a stream of
//! [`RelayEvent`]s. A frame carries one or more newline-delimited
//! notification objects. When the connection drops the relay reconnects with
//! exponential backoff; the feed it feeds is never touched by reconnects.
//! Messages pushed while disconnected are not replayed.

use std::time::Duration;
use async_stream::stream;
use futures::{Stream, StreamExt};
use rand::Rng;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use url::Url;
use crate::config::RelayConfig;
use crate::models::Notification;
use crate::state::{Alert, NotificationFeed, RequestContext};
use crate::utils::errors::Result;
use crate::utils::logging::log_relay_event;

/// Something that happened on the relay connection
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    Connected,
    Notification(Notification),
    /// A frame line that could not be parsed as a notification
    Dropped { reason: String },
    Disconnected { reason: String },
    Reconnecting { attempt: u32, delay: Duration },
    /// Consecutive connect failures hit the limit; the stream ends
    GaveUp { attempts: u32 },
}

/// Exponential backoff between reconnect attempts
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    initial: Duration,
    max: Duration,
    max_attempts: u32,
    jitter: f64,
}

impl ReconnectPolicy {
    pub fn new(initial: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            initial,
            max: max.max(initial),
            max_attempts,
            jitter: 0.2,
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
            config.max_attempts,
        )
    }

    /// Disable jitter, mostly for predictable delays in tests
    pub fn without_jitter(mut self) -> Self {
        self.jitter = 0.0;
        self
    }

    /// Delay before `attempt` (1-based) without jitter
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max)
            .min(self.max)
    }

    /// Delay before `attempt` with jitter applied, never above the cap
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt);
        if self.jitter <= 0.0 {
            return base;
        }
        let factor = rand::thread_rng().gen_range((1.0 - self.jitter)..=(1.0 + self.jitter));
        base.mul_f64(factor).min(self.max)
    }

    /// Whether `failures` consecutive failed connects exhaust the policy
    pub fn exhausted(&self, failures: u32) -> bool {
        self.max_attempts != 0 && failures >= self.max_attempts
    }
}

#[derive(Debug, Clone)]
pub struct NotificationRelay {
    url: Url,
    policy: ReconnectPolicy,
}

impl NotificationRelay {
    pub fn new(config: &RelayConfig) -> Result<Self> {
        Ok(Self {
            url: Url::parse(&config.url)?,
            policy: ReconnectPolicy::from_config(config),
        })
    }

    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Socket URL for this context; the bearer token travels as `token`
    pub fn connect_url(&self, ctx: &RequestContext) -> Url {
        let mut url = self.url.clone();
        if let Some(token) = ctx.bearer_token() {
            url.query_pairs_mut().append_pair("token", token);
        }
        url
    }

    /// Stream of relay events; runs until the reconnect policy gives up
    pub fn events(&self, ctx: &RequestContext) -> impl Stream<Item = RelayEvent> + Send + 'static {
        let url = self.connect_url(ctx);
        let policy = self.policy.clone();

        stream! {
            let mut failures: u32 = 0;

            loop {
                match connect_async(url.as_str()).await {
                    Ok((mut socket, _)) => {
                        failures = 0;
                        log_relay_event("connected", None, None);
                        yield RelayEvent::Connected;

                        let reason = loop {
                            match socket.next().await {
                                Some(Ok(Message::Text(text))) => {
                                    for line in text.as_str().lines().map(str::trim).filter(|l| !l.is_empty()) {
                                        match serde_json::from_str::<Notification>(line) {
                                            Ok(notification) => yield RelayEvent::Notification(notification),
                                            Err(e) => {
                                                warn!(error = %e, "Dropping unparsable notification");
                                                yield RelayEvent::Dropped { reason: e.to_string() };
                                            }
                                        }
                                    }
                                }
                                Some(Ok(Message::Close(frame))) => {
                                    break frame
                                        .map(|f| f.reason.as_str().to_string())
                                        .filter(|r| !r.is_empty())
                                        .unwrap_or_else(|| "closed by server".to_string());
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => break e.to_string(),
                                None => break "connection closed".to_string(),
                            }
                        };

                        log_relay_event("disconnected", None, Some(&reason));
                        yield RelayEvent::Disconnected { reason };
                    }
                    Err(e) => {
                        failures += 1;
                        let reason = e.to_string();
                        log_relay_event("connect_failed", Some(failures), Some(&reason));
                        yield RelayEvent::Disconnected { reason };
                    }
                }

                if policy.exhausted(failures) {
                    log_relay_event("gave_up", Some(failures), None);
                    yield RelayEvent::GaveUp { attempts: failures };
                    break;
                }

                let attempt = failures + 1;
                let delay = policy.delay(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Scheduling relay reconnect");
                yield RelayEvent::Reconnecting { attempt, delay };
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Applies relay events to a notification feed
#[derive(Debug, Clone, Default)]
pub struct NotificationCenter {
    feed: NotificationFeed,
}

impl NotificationCenter {
    pub fn new(capacity: usize) -> Self {
        Self {
            feed: NotificationFeed::new(capacity),
        }
    }

    pub fn feed(&self) -> &NotificationFeed {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut NotificationFeed {
        &mut self.feed
    }

    /// Apply one event; notifications are pushed and produce an alert
    pub fn apply(&mut self, event: &RelayEvent) -> Option<Alert> {
        match event {
            RelayEvent::Notification(notification) => Some(self.feed.push(notification.clone())),
            _ => None,
        }
    }

    /// Consume a relay stream in arrival order until it ends
    pub async fn run<S, F>(&mut self, events: S, mut sink: F)
    where
        S: Stream<Item = RelayEvent>,
        F: FnMut(&RelayEvent, Option<&Alert>),
    {
        futures::pin_mut!(events);
        while let Some(event) = events.next().await {
            let alert = self.apply(&event);
            sink(&event, alert.as_ref());
        }
    }
}
