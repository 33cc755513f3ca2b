pub mod client;
pub mod heartbeat;
pub mod metric;
pub mod summary;

pub use client::Client;
pub use metric::{MetricRatio, MetricRatioData};
pub use summary::{GrandTotal, Summary, TimelineItem};
