use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ==== Scheduler Metrics ====
    pub static ref SCHEDULER_TASKS_ENQUEUED: IntCounterVec = {
        let metric = IntCounterVec::new(
            Opts::new(
                "scheduler_tasks_enqueued_total",
                "Total number of tasks accepted into per-camera queues",
            ),
            &["layer"],
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref SCHEDULER_TASKS_PREEMPTED: IntCounter = {
        let metric = IntCounter::new(
            "scheduler_cinematic_tasks_preempted_total",
            "Total number of cinematic tasks dropped by PTZ preemption",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref SCHEDULER_POLLS: IntCounter = {
        let metric = IntCounter::new(
            "scheduler_fd_polls_total",
            "Total number of field-device polls processed",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    // ==== Event Bus Metrics ====
    pub static ref EVENT_BUS_EVENTS_DROPPED: IntCounter = {
        let metric = IntCounter::new(
            "event_bus_events_dropped_total",
            "Total number of events dropped on full subscriber buffers",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    pub static ref EVENT_BUS_SUBSCRIBERS: IntGauge = {
        let metric = IntGauge::new(
            "event_bus_subscribers",
            "Number of live event bus subscribers",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    // ==== Registry Metrics ====
    pub static ref REGISTRY_CAMERAS: IntGauge = {
        let metric = IntGauge::new(
            "camera_registry_cameras",
            "Number of registered cameras",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };

    // ==== Pattern Matching Metrics ====
    pub static ref PATTERN_SESSIONS_ACTIVE: IntGauge = {
        let metric = IntGauge::new(
            "pattern_matching_sessions_active",
            "Number of active pattern matching sessions",
        )
        .expect("metric can be created");
        REGISTRY.register(Box::new(metric.clone())).ok();
        metric
    };
}

pub fn metrics_registry() -> &'static Registry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_gathers_registered_metrics() {
        SCHEDULER_TASKS_ENQUEUED.with_label_values(&["ptz"]).inc();
        SCHEDULER_TASKS_PREEMPTED.inc();
        let families = metrics_registry().gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "scheduler_tasks_enqueued_total"));
    }
}
