//! Rate-limited recompute notices.
//!
//! Every successful computation offers an event. Events are coalesced into
//! a single [`RecomputeNotice`] that is released once no new event has
//! arrived for the debounce period, or once its oldest event has waited the
//! longer of the two windows, and never sooner than the minimum interval
//! after the previous release. Consumers must treat a notice as "something
//! changed, refresh" and not rely on seeing every punch.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Topic carried by every recompute notice.
pub const RECOMPUTED_TOPIC: &str = "recomputed";

/// One recomputed punch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecomputeEvent {
    /// The punch whose result changed.
    pub punch_id: String,
    /// The punch's employee.
    pub employee_id: String,
}

impl RecomputeEvent {
    /// Creates an event.
    pub fn new(punch_id: impl Into<String>, employee_id: impl Into<String>) -> Self {
        Self {
            punch_id: punch_id.into(),
            employee_id: employee_id.into(),
        }
    }
}

/// The coalesced notice published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecomputeNotice {
    /// Always [`RECOMPUTED_TOPIC`].
    pub topic: String,
    /// Distinct punches recomputed since the previous notice, in arrival order.
    pub punch_ids: Vec<String>,
    /// Distinct employees affected, in arrival order.
    pub employee_ids: Vec<String>,
    /// How many events were folded into this notice.
    pub coalesced: usize,
    /// When the notice was released.
    pub emitted_at: DateTime<Utc>,
}

/// Receives released notices.
pub trait EventSink: Send + Sync {
    /// Publishes a notice. Delivery failures are the sink's concern.
    fn publish(&self, notice: &RecomputeNotice);
}

/// Logs notices through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn publish(&self, notice: &RecomputeNotice) {
        info!(
            topic = %notice.topic,
            punches = notice.punch_ids.len(),
            employees = notice.employee_ids.len(),
            coalesced = notice.coalesced,
            "Recompute notice released"
        );
    }
}

/// Fans notices out over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<RecomputeNotice>,
}

impl BroadcastSink {
    /// Creates a channel holding up to `capacity` undelivered notices.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to future notices.
    pub fn subscribe(&self) -> broadcast::Receiver<RecomputeNotice> {
        self.sender.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, notice: &RecomputeNotice) {
        if self.sender.send(notice.clone()).is_err() {
            debug!(topic = %notice.topic, "No subscribers for recompute notice");
        }
    }
}

#[derive(Debug)]
struct Pending {
    first_event: Instant,
    punch_ids: Vec<String>,
    employee_ids: Vec<String>,
    seen_punches: HashSet<String>,
    seen_employees: HashSet<String>,
    coalesced: usize,
}

impl Pending {
    fn new(first_event: Instant) -> Self {
        Self {
            first_event,
            punch_ids: Vec::new(),
            employee_ids: Vec::new(),
            seen_punches: HashSet::new(),
            seen_employees: HashSet::new(),
            coalesced: 0,
        }
    }

    fn add(&mut self, event: RecomputeEvent) {
        if self.seen_punches.insert(event.punch_id.clone()) {
            self.punch_ids.push(event.punch_id);
        }
        if self.seen_employees.insert(event.employee_id.clone()) {
            self.employee_ids.push(event.employee_id);
        }
        self.coalesced += 1;
    }
}

#[derive(Debug, Default)]
struct NotifierState {
    last_emit: Option<Instant>,
    last_offer: Option<Instant>,
    pending: Option<Pending>,
}

/// Debounced, minimum-interval publisher of recompute notices.
///
/// Time is passed in by the caller so the release rules can be driven
/// deterministically.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::{Duration, Instant};
/// use timebank_engine::engine::{RecomputeEvent, RecomputeNotifier, TracingSink};
///
/// let notifier = RecomputeNotifier::new(
///     Duration::from_millis(100),
///     Duration::from_secs(1),
///     Arc::new(TracingSink),
/// );
/// let start = Instant::now();
/// assert!(notifier.offer(RecomputeEvent::new("p1", "e1"), start).is_none());
/// assert!(notifier.offer(RecomputeEvent::new("p2", "e1"), start).is_none());
///
/// let notice = notifier.tick(start + Duration::from_millis(150)).unwrap();
/// assert_eq!(notice.punch_ids, vec!["p1", "p2"]);
/// assert_eq!(notice.coalesced, 2);
/// ```
pub struct RecomputeNotifier {
    debounce: Duration,
    min_interval: Duration,
    sink: Arc<dyn EventSink>,
    state: Mutex<NotifierState>,
}

impl std::fmt::Debug for RecomputeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecomputeNotifier")
            .field("debounce", &self.debounce)
            .field("min_interval", &self.min_interval)
            .finish_non_exhaustive()
    }
}

impl RecomputeNotifier {
    /// Creates a notifier publishing to `sink`.
    pub fn new(debounce: Duration, min_interval: Duration, sink: Arc<dyn EventSink>) -> Self {
        Self {
            debounce,
            min_interval,
            sink,
            state: Mutex::new(NotifierState::default()),
        }
    }

    /// Records an event and releases the pending notice if it is due.
    pub fn offer(&self, event: RecomputeEvent, now: Instant) -> Option<RecomputeNotice> {
        let notice = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state
                .pending
                .get_or_insert_with(|| Pending::new(now))
                .add(event);
            state.last_offer = Some(now);
            self.take_due(&mut state, now)
        };
        self.publish(notice)
    }

    /// Releases the pending notice if it has become due.
    pub fn tick(&self, now: Instant) -> Option<RecomputeNotice> {
        let notice = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            self.take_due(&mut state, now)
        };
        self.publish(notice)
    }

    /// Returns true when events are waiting to be released.
    pub fn has_pending(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending
            .is_some()
    }

    /// Longest an event waits for a quiet period before it is released anyway.
    fn max_wait(&self) -> Duration {
        self.debounce.max(self.min_interval)
    }

    fn take_due(&self, state: &mut NotifierState, now: Instant) -> Option<RecomputeNotice> {
        let first_event = state.pending.as_ref()?.first_event;

        let quiet = state
            .last_offer
            .is_none_or(|offered| now.saturating_duration_since(offered) >= self.debounce);
        let overdue = now.saturating_duration_since(first_event) >= self.max_wait();
        let spaced = state
            .last_emit
            .is_none_or(|emitted| now.saturating_duration_since(emitted) >= self.min_interval);
        if !((quiet || overdue) && spaced) {
            return None;
        }

        let pending = state.pending.take()?;
        state.last_emit = Some(now);
        Some(RecomputeNotice {
            topic: RECOMPUTED_TOPIC.to_string(),
            punch_ids: pending.punch_ids,
            employee_ids: pending.employee_ids,
            coalesced: pending.coalesced,
            emitted_at: Utc::now(),
        })
    }

    fn publish(&self, notice: Option<RecomputeNotice>) -> Option<RecomputeNotice> {
        if let Some(notice) = &notice {
            self.sink.publish(notice);
        }
        notice
    }
}
