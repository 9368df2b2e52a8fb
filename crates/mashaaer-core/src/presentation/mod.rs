//! Read-only projections of the timeline for display.
pub mod flow;
pub mod palette;
pub mod view;
pub use flow::{flow, FlowPoint, FlowSeries, FLOW_LANES};
pub use palette::{color_for, display_name, emoji_for, FALLBACK_COLOR, FALLBACK_EMOJI};
pub use view::{render, DayGroup, LiveView, Summary, TimelineRow, TimelineView, EMPTY_HINT, EMPTY_MESSAGE};
