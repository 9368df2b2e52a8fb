//! Manual sync with the configured endpoint.

use mashaaer_core::SyncDispatch;

use super::open_timeline;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (_, mut timeline) = open_timeline()?;

    let dispatch = timeline.sync_now();
    let entry_count = match &dispatch {
        SyncDispatch::Skipped(reason) => return Err(format!("sync skipped: {reason}").into()),
        SyncDispatch::Dispatched { entry_count, .. } => *entry_count,
    };

    if let Some(result) = dispatch.wait().await {
        let reply = result?;
        eprintln!("synced {entry_count} entries");
        println!("{}", serde_json::to_string_pretty(&reply)?);
    }
    Ok(())
}
