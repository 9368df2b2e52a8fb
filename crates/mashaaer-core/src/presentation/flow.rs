//! Emotion-flow series: entries plotted oldest first over normalised time,
//! one horizontal lane per emotion.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::palette::color_for;
use super::view::EMPTY_MESSAGE;
use crate::emotion::{Emotion, EmotionEntry};

/// Lanes from top to bottom. Tags without a lane are drawn on `neutral`.
pub const FLOW_LANES: [&str; 6] = ["happy", "confident", "neutral", "anxious", "sad", "angry"];

const NEUTRAL_LANE: usize = 2;

/// Character columns used by the text rendering.
const CHART_WIDTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowPoint {
    /// Position in time, 0.0 (oldest) to 1.0 (newest).
    pub x: f64,
    /// Index into [`FLOW_LANES`].
    pub lane: usize,
    /// Lane position, 0.0 (top) to 1.0 (bottom).
    pub y: f64,
    pub timestamp: DateTime<Utc>,
    pub emotion: Emotion,
    pub intensity: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSeries {
    pub lanes: [&'static str; 6],
    pub points: Vec<FlowPoint>,
}

impl FlowSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn lane_for(emotion: &Emotion) -> usize {
    FLOW_LANES
        .iter()
        .position(|lane| *lane == emotion.as_str())
        .unwrap_or(NEUTRAL_LANE)
}

/// Project entries onto the flow chart.
///
/// When every entry shares one timestamp all points sit at `x = 0.0`.
pub fn flow(entries: &[EmotionEntry]) -> FlowSeries {
    let mut sorted: Vec<&EmotionEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let range_ms = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => (last.timestamp - first.timestamp).num_milliseconds(),
        _ => 0,
    };
    let start = sorted.first().map(|e| e.timestamp);

    let points = sorted
        .into_iter()
        .map(|entry| {
            let x = match start {
                Some(start) if range_ms > 0 => {
                    (entry.timestamp - start).num_milliseconds() as f64 / range_ms as f64
                }
                _ => 0.0,
            };
            let lane = lane_for(&entry.emotion);
            FlowPoint {
                x,
                lane,
                y: lane as f64 / (FLOW_LANES.len() - 1) as f64,
                timestamp: entry.timestamp,
                emotion: entry.emotion.clone(),
                intensity: entry.intensity,
                color: color_for(&entry.emotion),
            }
        })
        .collect();

    FlowSeries {
        lanes: FLOW_LANES,
        points,
    }
}

impl fmt::Display for FlowSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{EMPTY_MESSAGE}");
        }

        let mut grid = vec![vec![' '; CHART_WIDTH]; FLOW_LANES.len()];
        for point in &self.points {
            let col = (point.x * (CHART_WIDTH - 1) as f64).round() as usize;
            grid[point.lane][col.min(CHART_WIDTH - 1)] = '●';
        }

        for (lane, row) in FLOW_LANES.iter().zip(&grid) {
            writeln!(f, "{lane:>9} |{}", row.iter().collect::<String>())?;
        }
        write!(f, "{:>9} +{}", "", "-".repeat(CHART_WIDTH))
    }
}
