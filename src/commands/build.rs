use std::path::Path;

use super::{Workspace, print_failures};

pub async fn run(workspace: &Path) -> Result<(), anyhow::Error> {
    let workspace = Workspace::open(workspace)?;
    let publisher = workspace.publisher()?;

    let report = publisher.regenerate_all().await?;
    println!(
        "Built site to {} with theme {} ({} file(s) written, {} removed)",
        publisher.output_root().display(),
        workspace.settings.theme.display_name(),
        report.written.len(),
        report.removed.len()
    );

    if print_failures(&report) {
        return Err(anyhow::anyhow!("{} file(s) could not be updated", report.failed.len()));
    }
    Ok(())
}
