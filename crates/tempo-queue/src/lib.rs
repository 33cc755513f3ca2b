pub mod error;
pub mod offline;
pub mod store;

pub use error::QueueError;
pub use offline::{push_with_retry, queue_filepath, save_first, with_queue, MAX_REQUEUE_ATTEMPTS};
pub use store::QueueStore;
