pub mod config;
pub mod session;

pub use config::{EngineConfig, GestureConfig, LookupConfig, ScrollConfig, WaitConfig};
pub use session::{AutomationSession, ElementHandle};
