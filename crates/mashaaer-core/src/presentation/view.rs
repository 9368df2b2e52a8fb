//! Timeline list view: newest first, grouped by local day.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use serde::Serialize;
use std::fmt;

use super::palette::{color_for, display_name, emoji_for};
use crate::emotion::{Emotion, EmotionEntry};
use crate::events::{Event, Subscription};
use crate::timeline::{TimelineDocument, TimelineStats};

pub const EMPTY_MESSAGE: &str = "لا توجد بيانات مشاعر متاحة بعد.";
pub const EMPTY_HINT: &str = "تفاعل مع مشاعر لبدء تسجيل مشاعرك.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub time: NaiveTime,
    pub emotion: Emotion,
    pub name: String,
    pub emoji: &'static str,
    pub color: &'static str,
    pub intensity_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub rows: Vec<TimelineRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub most_frequent: Option<Emotion>,
    pub average_intensity_percent: u8,
    pub entry_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TimelineView {
    Empty {
        message: &'static str,
        hint: &'static str,
    },
    Entries {
        days: Vec<DayGroup>,
        summary: Summary,
    },
}

impl TimelineView {
    pub fn is_empty(&self) -> bool {
        matches!(self, TimelineView::Empty { .. })
    }

    pub fn row_count(&self) -> usize {
        match self {
            TimelineView::Empty { .. } => 0,
            TimelineView::Entries { days, .. } => days.iter().map(|d| d.rows.len()).sum(),
        }
    }
}

fn percent(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Project entries into display rows in the `tz` time zone.
pub fn render<Tz: TimeZone>(entries: &[EmotionEntry], stats: &TimelineStats, tz: &Tz) -> TimelineView {
    if entries.is_empty() {
        return TimelineView::Empty {
            message: EMPTY_MESSAGE,
            hint: EMPTY_HINT,
        };
    }

    let mut newest_first: Vec<&EmotionEntry> = entries.iter().collect();
    newest_first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut days: Vec<DayGroup> = Vec::new();
    for entry in newest_first {
        let local = entry.timestamp.with_timezone(tz);
        let row = TimelineRow {
            time: local.time(),
            emotion: entry.emotion.clone(),
            name: display_name(&entry.emotion).to_string(),
            emoji: emoji_for(&entry.emotion),
            color: color_for(&entry.emotion),
            intensity_percent: percent(entry.intensity),
        };
        let day = local.date_naive();
        match days.last_mut() {
            Some(group) if group.day == day => group.rows.push(row),
            _ => days.push(DayGroup { day, rows: vec![row] }),
        }
    }

    TimelineView::Entries {
        days,
        summary: Summary {
            most_frequent: stats.most_frequent.clone(),
            average_intensity_percent: percent(stats.average_intensity),
            entry_count: entries.len(),
        },
    }
}

impl fmt::Display for TimelineView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimelineView::Empty { message, hint } => {
                writeln!(f, "{message}")?;
                write!(f, "{hint}")
            }
            TimelineView::Entries { days, summary } => {
                for group in days {
                    writeln!(f, "── {} ──", group.day.format("%Y-%m-%d"))?;
                    for row in &group.rows {
                        writeln!(
                            f,
                            "  {}  {} {:<8} {:>3}%  {}",
                            row.time.format("%H:%M"),
                            row.emoji,
                            row.name,
                            row.intensity_percent,
                            row.color
                        )?;
                    }
                }
                let most = summary
                    .most_frequent
                    .as_ref()
                    .map(|e| format!("{} {}", emoji_for(e), display_name(e)))
                    .unwrap_or_else(|| "-".into());
                write!(
                    f,
                    "Most frequent: {most} | Average intensity: {}% | Entries: {}",
                    summary.average_intensity_percent, summary.entry_count
                )
            }
        }
    }
}

/// A rendered view kept current by timeline events.
///
/// Only `EntryAppended` causes a re-render; other events are consumed and
/// ignored.
pub struct LiveView<Tz: TimeZone> {
    events: Subscription<Event>,
    tz: Tz,
    view: TimelineView,
    renders: usize,
}

impl<Tz: TimeZone> LiveView<Tz> {
    pub fn new(events: Subscription<Event>, doc: &TimelineDocument, tz: Tz) -> Self {
        let view = render(&doc.entries, &doc.stats, &tz);
        Self {
            events,
            tz,
            view,
            renders: 1,
        }
    }

    /// Drain pending events and re-render from `doc` if an entry arrived.
    /// Returns whether the view changed.
    pub fn poll(&mut self, doc: &TimelineDocument) -> bool {
        let appended = self
            .events
            .drain()
            .filter(|e| matches!(e, Event::EntryAppended { .. }))
            .count();
        if appended == 0 {
            return false;
        }
        self.view = render(&doc.entries, &doc.stats, &self.tz);
        self.renders += 1;
        true
    }

    pub fn view(&self) -> &TimelineView {
        &self.view
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::presentation::FALLBACK_COLOR;
    use crate::timeline::stats;
    use chrono::{DateTime, FixedOffset, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn doc(entries: Vec<EmotionEntry>) -> TimelineDocument {
        let mut doc = TimelineDocument::new();
        doc.stats = stats::rebuild(&entries);
        doc.entries = entries;
        doc
    }

    #[test]
    fn empty_timeline_shows_placeholder() {
        let view = render(&[], &TimelineStats::default(), &Utc);
        assert!(view.is_empty());
        let text = view.to_string();
        assert!(text.contains(EMPTY_MESSAGE));
        assert!(text.contains(EMPTY_HINT));
    }

    #[test]
    fn rows_are_newest_first_and_grouped_by_day() {
        let d = doc(vec![
            EmotionEntry::at("happy".into(), 0.8, ts("2025-05-01T09:00:00Z")),
            EmotionEntry::at("sad".into(), 0.4, ts("2025-05-01T18:30:00Z")),
            EmotionEntry::at("angry".into(), 0.9, ts("2025-05-02T07:15:00Z")),
        ]);
        let TimelineView::Entries { days, summary } = render(&d.entries, &d.stats, &Utc) else {
            panic!("expected entries");
        };
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
        assert_eq!(days[1].rows[0].emotion.as_str(), "sad");
        assert_eq!(days[1].rows[1].emotion.as_str(), "happy");
        assert_eq!(days[1].rows[0].intensity_percent, 40);
        assert_eq!(summary.entry_count, 3);
        assert_eq!(summary.average_intensity_percent, 70);
    }

    #[test]
    fn local_offset_moves_entries_across_days() {
        let d = doc(vec![EmotionEntry::at("neutral".into(), 0.5, ts("2025-05-01T22:30:00Z"))]);
        let riyadh = FixedOffset::east_opt(3 * 3600).unwrap();
        let TimelineView::Entries { days, .. } = render(&d.entries, &d.stats, &riyadh) else {
            panic!("expected entries");
        };
        assert_eq!(days[0].day, NaiveDate::from_ymd_opt(2025, 5, 2).unwrap());
        assert_eq!(days[0].rows[0].time, NaiveTime::from_hms_opt(1, 30, 0).unwrap());
    }

    #[test]
    fn unknown_emotion_renders_with_fallback_color() {
        let d = doc(vec![EmotionEntry::at("bored".into(), 0.5, ts("2025-05-01T10:00:00Z"))]);
        let view = render(&d.entries, &d.stats, &Utc);
        let TimelineView::Entries { days, .. } = &view else {
            panic!("expected entries");
        };
        assert_eq!(days[0].rows[0].color, FALLBACK_COLOR);
        assert_eq!(days[0].rows[0].name, "bored");
        assert!(view.to_string().contains("bored"));
    }

    #[test]
    fn live_view_rerenders_only_on_append() {
        let mut bus = EventBus::new();
        let mut d = doc(Vec::new());
        let mut live = LiveView::new(bus.subscribe(), &d, Utc);
        assert!(live.view().is_empty());

        bus.publish(Event::ViewRequested { at: Utc::now() });
        assert!(!live.poll(&d));
        assert_eq!(live.render_count(), 1);

        let entry = EmotionEntry::observed("happy".into(), 0.8);
        d = doc(vec![entry.clone()]);
        bus.publish(Event::EntryAppended {
            entry,
            total_entries: 1,
            at: Utc::now(),
        });
        assert!(live.poll(&d));
        assert_eq!(live.render_count(), 2);
        assert_eq!(live.view().row_count(), 1);
    }
}
