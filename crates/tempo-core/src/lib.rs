pub mod format;
pub mod handle;
pub mod heartbeat;
pub mod user_agent;

pub use handle::{build_handle, Handle, HandleOption, Sender};
pub use heartbeat::{Heartbeat, HeartbeatParams, HeartbeatResult};
