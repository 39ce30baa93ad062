//! Plain data the controller works with: speeds, timestamps, video metadata
//! and analytics events.

pub mod analytics;
pub mod speed;
pub mod time;
pub mod video;

pub use analytics::{AnalyticsEvent, AnalyticsSink, LogSink};
pub use speed::{FixedTime, PlaybackSpeed, remap_time};
pub use time::{format_clock, progress_label};
pub use video::{SpeedStreams, VideoMetadata, parse_streams};
