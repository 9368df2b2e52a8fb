use mashaaer_core::Emotion;

use super::open_timeline;

pub async fn run(emotion: &str, intensity: f64) -> Result<(), Box<dyn std::error::Error>> {
    let emotion = Emotion::new(emotion)?;
    let (_, mut timeline) = open_timeline()?;

    let outcome = timeline.record(emotion, intensity);
    if !outcome.appended.saved.is_complete() {
        eprintln!("warning: entry recorded but could not be saved");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "entry": outcome.entry,
            "totalEntries": outcome.appended.total_entries,
        }))?
    );

    // The process exits after this, so wait for the sync instead of dropping it.
    if let Some(Err(e)) = outcome.sync.wait().await {
        eprintln!("warning: sync failed: {e}");
    }
    Ok(())
}
