use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use mashaaer_core::{render, TimePeriod};

use super::open_timeline;

#[derive(Subcommand)]
pub enum TimelineAction {
    /// Show the entries visible to the current subscription level
    Show {
        /// Output the view as JSON
        #[arg(long)]
        json: bool,
        /// Show the emotion-flow chart instead of the list (basic and premium)
        #[arg(long)]
        visual: bool,
    },
    /// Running statistics over every recorded entry
    Stats,
    /// Pattern recognition over a time window
    Patterns {
        /// day, week, month or quarter (defaults to analysis.default_period)
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        period: Option<String>,
        /// Start of a custom range (RFC 3339)
        #[arg(long, requires = "to")]
        from: Option<DateTime<Utc>>,
        /// End of a custom range (RFC 3339)
        #[arg(long, requires = "from")]
        to: Option<DateTime<Utc>>,
    },
    /// Print the full timeline document as JSON
    Export,
}

pub fn run(action: TimelineAction) -> Result<(), Box<dyn std::error::Error>> {
    let (config, mut timeline) = open_timeline()?;
    let now = Utc::now();

    match action {
        TimelineAction::Show { json, visual: true } => {
            timeline.view_requested();
            let series = timeline.visual_flow(now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                println!("{series}");
            }
        }
        TimelineAction::Show { json, visual: false } => {
            timeline.view_requested();
            let entries = timeline.visible_entries(now);
            let view = render(&entries, &timeline.document().stats, &Local);
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{view}");
            }
        }
        TimelineAction::Stats => {
            println!("{}", serde_json::to_string_pretty(&timeline.document().stats)?);
        }
        TimelineAction::Patterns { period, from, to } => {
            let period = match (period, from, to) {
                (_, Some(from), Some(to)) => TimePeriod::custom(from, to)?,
                (Some(name), _, _) => name.parse()?,
                _ => config.default_period(),
            };
            let report = timeline.patterns(period, now)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        TimelineAction::Export => {
            println!("{}", timeline.export_json()?);
        }
    }
    Ok(())
}
