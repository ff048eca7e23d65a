use crate::config::ServerConfig;
use crate::dispatch::CommandDispatcher;
use crate::event_bus::PtzEventBus;
use crate::outputs::VideoOutputStore;
use crate::registry::CameraRegistry;
use crate::scheduler::CommandScheduler;
use crate::sessions::PatternSessionStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub registry: Arc<CameraRegistry>,
    pub scheduler: Arc<CommandScheduler>,
    pub bus: Arc<PtzEventBus>,
    pub dispatcher: Arc<CommandDispatcher>,
    pub sessions: Arc<PatternSessionStore>,
    pub outputs: Arc<VideoOutputStore>,
    /// Process-level shutdown token. Long-polls and background tasks watch
    /// it and release their resources when it fires.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let bus = Arc::new(PtzEventBus::new(config.event_buffer_size));
        let dispatcher = Arc::new(CommandDispatcher::new(Arc::clone(&bus)));
        Self {
            config,
            registry: Arc::new(CameraRegistry::new()),
            scheduler: Arc::new(CommandScheduler::new()),
            bus,
            dispatcher,
            sessions: Arc::new(PatternSessionStore::new()),
            outputs: Arc::new(VideoOutputStore::new()),
            shutdown: CancellationToken::new(),
        }
    }
}
