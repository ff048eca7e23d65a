use common::ptz::PtzCommandEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::RwLock;
use tracing::debug;

/// Per-subscriber buffer depth. Slow consumers lose events past this.
pub const DEFAULT_EVENT_BUFFER: usize = 100;

struct SubscriberSlot {
    id: u64,
    tx: mpsc::Sender<PtzCommandEvent>,
}

/// A live subscription. Dropping it closes the channel; the bus prunes the
/// dead slot on the next publish. Call `PtzEventBus::unsubscribe` for prompt
/// removal.
pub struct EventSubscription {
    camera_id: String,
    id: u64,
    rx: mpsc::Receiver<PtzCommandEvent>,
}

impl EventSubscription {
    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next event, FIFO per subscriber. None once unsubscribed.
    pub async fn recv(&mut self) -> Option<PtzCommandEvent> {
        self.rx.recv().await
    }
}

/// Per-camera fan-out of PTZ command events. Publication is non-blocking:
/// a full subscriber buffer drops the event for that subscriber only.
pub struct PtzEventBus {
    buffer_size: usize,
    next_subscriber_id: AtomicU64,
    subscribers: RwLock<HashMap<String, Vec<SubscriberSlot>>>,
    last_events: RwLock<HashMap<String, PtzCommandEvent>>,
}

impl PtzEventBus {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
            next_subscriber_id: AtomicU64::new(1),
            subscribers: RwLock::new(HashMap::new()),
            last_events: RwLock::new(HashMap::new()),
        }
    }

    /// Register a subscriber for one camera. The cached last event, if any,
    /// is replayed immediately (best-effort).
    pub async fn subscribe(&self, camera_id: &str) -> EventSubscription {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);

        {
            let mut subscribers = self.subscribers.write().await;
            subscribers
                .entry(camera_id.to_string())
                .or_default()
                .push(SubscriberSlot { id, tx: tx.clone() });
        }
        telemetry::metrics::EVENT_BUS_SUBSCRIBERS.inc();

        if let Some(event) = self.last_events.read().await.get(camera_id) {
            let _ = tx.try_send(event.clone());
        }

        debug!(camera_id = %camera_id, subscriber_id = id, "subscriber registered");
        EventSubscription {
            camera_id: camera_id.to_string(),
            id,
            rx,
        }
    }

    /// Remove a subscriber and close its channel. Idempotent.
    pub async fn unsubscribe(&self, subscription: &EventSubscription) {
        let mut subscribers = self.subscribers.write().await;
        let Some(slots) = subscribers.get_mut(&subscription.camera_id) else {
            return;
        };

        let before = slots.len();
        slots.retain(|slot| slot.id != subscription.id);
        if slots.len() < before {
            telemetry::metrics::EVENT_BUS_SUBSCRIBERS.dec();
            debug!(
                camera_id = %subscription.camera_id,
                subscriber_id = subscription.id,
                "subscriber removed"
            );
        }
        if slots.is_empty() {
            subscribers.remove(&subscription.camera_id);
        }
    }

    /// Fan an event out to every current subscriber of the camera and cache
    /// it for late subscribers. Closed subscribers are pruned here.
    pub async fn publish(&self, camera_id: &str, event: PtzCommandEvent) {
        {
            let mut last_events = self.last_events.write().await;
            last_events.insert(camera_id.to_string(), event.clone());
        }

        let mut subscribers = self.subscribers.write().await;
        let Some(slots) = subscribers.get_mut(camera_id) else {
            return;
        };

        let mut pruned = 0usize;
        slots.retain(|slot| match slot.tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                telemetry::metrics::EVENT_BUS_EVENTS_DROPPED.inc();
                debug!(
                    camera_id = %camera_id,
                    subscriber_id = slot.id,
                    "subscriber buffer full, event dropped"
                );
                true
            }
            Err(TrySendError::Closed(_)) => {
                pruned += 1;
                false
            }
        });

        if pruned > 0 {
            telemetry::metrics::EVENT_BUS_SUBSCRIBERS.sub(pruned as i64);
        }
        if slots.is_empty() {
            subscribers.remove(camera_id);
        }
    }

    /// Cached most-recent event for a camera.
    pub async fn last_event(&self, camera_id: &str) -> Option<PtzCommandEvent> {
        self.last_events.read().await.get(camera_id).cloned()
    }
}

impl Default for PtzEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ptz::{ControlCommand, PtzParameters};

    fn event(pan: f64) -> PtzCommandEvent {
        PtzCommandEvent {
            command: Some(ControlCommand {
                command_id: format!("cmd-{pan}"),
                camera_id: "cam-b".to_string(),
                ptz_parameters: Some(PtzParameters {
                    pan,
                    tilt: 5.0,
                    zoom: 2.0,
                    ..Default::default()
                }),
            }),
            result: None,
            timestamp_ms: 1,
        }
    }

    #[tokio::test]
    async fn fan_out_reaches_every_subscriber() {
        let bus = PtzEventBus::new(8);
        let mut first = bus.subscribe("cam-b").await;
        let mut second = bus.subscribe("cam-b").await;

        bus.publish("cam-b", event(10.0)).await;

        let got_first = first.recv().await.expect("first subscriber event");
        let got_second = second.recv().await.expect("second subscriber event");
        let pan = |e: &PtzCommandEvent| {
            e.command
                .as_ref()
                .and_then(|c| c.ptz_parameters.as_ref())
                .map(|p| p.pan)
                .unwrap_or_default()
        };
        assert!((pan(&got_first) - 10.0).abs() < 0.01);
        assert!((pan(&got_second) - 10.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn delivery_is_fifo_per_subscriber() {
        let bus = PtzEventBus::new(8);
        let mut sub = bus.subscribe("cam-b").await;

        for i in 0..5 {
            bus.publish("cam-b", event(i as f64)).await;
        }

        for i in 0..5 {
            let received = sub.recv().await.expect("event");
            let pan = received
                .command
                .and_then(|c| c.ptz_parameters)
                .map(|p| p.pan)
                .unwrap_or_default();
            assert!((pan - i as f64).abs() < 0.01);
        }
    }

    #[tokio::test]
    async fn full_buffer_drops_without_blocking() {
        let bus = PtzEventBus::new(2);
        let mut sub = bus.subscribe("cam-b").await;

        // Two fit, the third is dropped for this subscriber.
        bus.publish("cam-b", event(0.0)).await;
        bus.publish("cam-b", event(1.0)).await;
        bus.publish("cam-b", event(2.0)).await;

        assert!(sub.recv().await.is_some());
        assert!(sub.recv().await.is_some());
        assert!(sub.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn late_subscriber_receives_cached_last_event() {
        let bus = PtzEventBus::new(8);
        bus.publish("cam-b", event(7.0)).await;

        let mut sub = bus.subscribe("cam-b").await;
        let replayed = sub.recv().await.expect("cached event");
        let pan = replayed
            .command
            .and_then(|c| c.ptz_parameters)
            .map(|p| p.pan)
            .unwrap_or_default();
        assert!((pan - 7.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn unsubscribe_closes_channel_and_is_idempotent() {
        let bus = PtzEventBus::new(8);
        let mut sub = bus.subscribe("cam-b").await;

        bus.unsubscribe(&sub).await;
        bus.unsubscribe(&sub).await;

        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn dropped_subscriber_is_pruned_on_publish() {
        let bus = PtzEventBus::new(8);
        let sub = bus.subscribe("cam-b").await;
        drop(sub);

        bus.publish("cam-b", event(1.0)).await;

        let subscribers = bus.subscribers.read().await;
        assert!(!subscribers.contains_key("cam-b"));
    }

    #[tokio::test]
    async fn publish_without_subscribers_only_caches() {
        let bus = PtzEventBus::new(8);
        bus.publish("cam-b", event(3.0)).await;
        assert!(bus.last_event("cam-b").await.is_some());
        assert!(bus.last_event("cam-z").await.is_none());
    }
}
