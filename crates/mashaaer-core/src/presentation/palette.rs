//! Static display tables keyed by emotion tag.

use crate::emotion::{Emotion, KNOWN_EMOTIONS};

pub const FALLBACK_COLOR: &str = "#9370db";
pub const FALLBACK_EMOJI: &str = "😐";

// (tag, color, emoji)
const PALETTE: [(&str, &str, &str); 7] = [
    ("happy", "#50fa7b", "😊"),
    ("sad", "#6272a4", "😢"),
    ("angry", "#ff5555", "😠"),
    ("surprised", "#ffb86c", "😲"),
    ("neutral", "#9370db", "😐"),
    ("anxious", "#bd93f9", "😰"),
    ("confident", "#f1fa8c", "💪"),
];

/// (color, emoji) for a known tag.
fn lookup(emotion: &Emotion) -> Option<(&'static str, &'static str)> {
    PALETTE
        .iter()
        .find(|(tag, _, _)| *tag == emotion.as_str())
        .map(|&(_, color, emoji)| (color, emoji))
}

pub fn color_for(emotion: &Emotion) -> &'static str {
    lookup(emotion).map_or(FALLBACK_COLOR, |(color, _)| color)
}

pub fn emoji_for(emotion: &Emotion) -> &'static str {
    lookup(emotion).map_or(FALLBACK_EMOJI, |(_, emoji)| emoji)
}

/// Arabic display name, or the raw tag for emotions without one.
pub fn display_name(emotion: &Emotion) -> &str {
    KNOWN_EMOTIONS
        .iter()
        .find(|(tag, _)| *tag == emotion.as_str())
        .map_or(emotion.as_str(), |&(_, name)| name)
}
