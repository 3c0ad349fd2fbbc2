//! `shelf watch`: keep the collection in sync with the folder

use std::time::Duration;

use anyhow::{Context, Result};

use super::app::Session;
use crate::storage::{FolderWatcher, ScanReport};

pub(crate) fn run(session: &Session) -> Result<()> {
    let output = &session.output;
    let mut store = session.open_store()?;
    report(session, store.recipes().len(), None);

    let debounce = Duration::from_millis(session.config.watch.debounce_millis);
    let watcher = FolderWatcher::start(&session.library, debounce, store.rescan_signal())
        .context("Failed to start folder watcher")?;
    output.verbose_ctx(
        "watch",
        &format!(
            "Watching {} (debounce: {}ms)",
            watcher.folder().display(),
            session.config.watch.debounce_millis
        ),
    );

    while watcher.wait() {
        match store.process_pending() {
            Ok(Some(scan)) if !scan.skipped => report(session, store.recipes().len(), Some(&scan)),
            Ok(_) => {}
            Err(e) => output.warn(&format!("Rescan failed: {}", e)),
        }
    }

    Ok(())
}

fn report(session: &Session, count: usize, scan: Option<&ScanReport>) {
    let output = &session.output;
    if output.is_json() {
        output.data(&serde_json::json!({
            "recipes": count,
            "scan": scan,
        }));
        return;
    }

    match scan {
        None => println!("Watching {} ({} recipes)", session.library.display(), count),
        Some(scan) => println!(
            "Rescanned: {} recipes ({} parsed, {} reused, {} removed, {} failed)",
            count, scan.parsed, scan.reused, scan.removed, scan.failed
        ),
    }
}
