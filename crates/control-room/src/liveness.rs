use crate::registry::CameraRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Background worker that marks silent cameras offline. Heartbeats arrive
/// through state reports and FD polls; this loop only notices their absence.
pub struct LivenessMonitor {
    registry: Arc<CameraRegistry>,
    check_interval: Duration,
    shutdown: CancellationToken,
}

impl LivenessMonitor {
    pub fn new(
        registry: Arc<CameraRegistry>,
        check_interval_secs: u64,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry,
            check_interval: Duration::from_secs(check_interval_secs.max(1)),
            shutdown,
        }
    }

    /// Run until the shutdown token fires.
    pub async fn start(&self) {
        info!(
            interval_secs = self.check_interval.as_secs(),
            "liveness monitor started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("liveness monitor stopped");
                    return;
                }
                _ = sleep(self.check_interval) => {
                    let reaped = self.registry.reap_disconnected().await;
                    for camera_id in &reaped {
                        warn!(camera_id = %camera_id, "camera heartbeat timed out, marked offline");
                    }
                }
            }
        }
    }
}
