pub mod config;
pub mod dispatch;
pub mod event_bus;
pub mod liveness;
pub mod llm;
pub mod outputs;
pub mod registry;
pub mod routes;
pub mod scheduler;
pub mod sessions;
pub mod state;

pub use config::ServerConfig;
pub use dispatch::CommandDispatcher;
pub use event_bus::{EventSubscription, PtzEventBus};
pub use liveness::LivenessMonitor;
pub use outputs::VideoOutputStore;
pub use registry::CameraRegistry;
pub use scheduler::CommandScheduler;
pub use sessions::PatternSessionStore;
pub use state::AppState;
