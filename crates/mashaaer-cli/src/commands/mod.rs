pub mod access;
pub mod config;
pub mod record;
pub mod sync;
pub mod timeline;

use mashaaer_core::{Config, EmotionTimeline};

/// Open the timeline described by the on-disk config.
pub fn open_timeline() -> Result<(Config, EmotionTimeline), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let timeline = EmotionTimeline::open(&config)?;
    Ok((config, timeline))
}
