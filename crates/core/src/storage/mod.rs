use crate::domain::snapshot::Snapshot;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::Path;

pub fn load_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read rates file {}", path.display()))?;
    serde_json::from_str::<Snapshot>(&text)
        .with_context(|| format!("rates file {} is not a valid snapshot", path.display()))
}

/// Replaces `path` with `snapshot` (2-space indented JSON).
///
/// The new contents go to a temporary file in the same directory which is then
/// renamed over the target, so readers see either the old file or the new one.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> anyhow::Result<()> {
    let mut body = serde_json::to_string_pretty(snapshot).context("failed to serialize snapshot")?;
    body.push('\n');

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;

    // Keep the original file mode instead of the temp file's 0600.
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .context("failed to copy rates file permissions")?;
    }

    tmp.write_all(body.as_bytes())
        .context("failed to write snapshot to temp file")?;
    tmp.as_file()
        .sync_all()
        .context("failed to sync snapshot temp file")?;

    tmp.persist(path)
        .with_context(|| format!("failed to replace rates file {}", path.display()))?;

    Ok(())
}
