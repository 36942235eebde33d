use crate::domain::merge::{apply_update, ProductChange};
use crate::domain::snapshot::Snapshot;
use crate::ingest::env::RateInputs;
use crate::storage;
use crate::time::stamp::UpdateStamp;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub snapshot: Snapshot,
    pub changes: Vec<ProductChange>,
    pub written: bool,
}

/// Runs one read-merge-write pass over the rates file at `path`.
///
/// Inputs are validated and the prior snapshot is loaded before anything is
/// written, so any error leaves the file as it was.
pub fn update_rates_file(
    path: &Path,
    inputs: &RateInputs,
    stamp: &UpdateStamp,
    dry_run: bool,
) -> anyhow::Result<UpdateOutcome> {
    let rates = inputs.parse()?;
    let prior = storage::load_snapshot(path)?;

    let (snapshot, changes) = apply_update(prior, &rates, stamp)?;

    for change in &changes {
        tracing::info!(
            product = %change.key,
            rate = change.rate_value,
            rate_change = change.rate_change,
            trend = %change.trend,
            "rate updated"
        );
    }

    if dry_run {
        tracing::info!(path = %path.display(), dry_run = true, "skipping rates file write");
        return Ok(UpdateOutcome {
            snapshot,
            changes,
            written: false,
        });
    }

    storage::write_snapshot(path, &snapshot)?;
    tracing::info!(
        path = %path.display(),
        last_updated = %snapshot.last_updated,
        products = changes.len(),
        "rates file written"
    );

    Ok(UpdateOutcome {
        snapshot,
        changes,
        written: true,
    })
}
