pub mod cameras;
pub mod detection;
pub mod ids;
pub mod outputs;
pub mod ptz;
pub mod tasks;
pub mod validation;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
