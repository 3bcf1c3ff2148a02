use std::path::Path;

use crate::CleanArgs;

use super::Workspace;

pub async fn run(workspace: &Path, args: &CleanArgs) -> Result<(), anyhow::Error> {
    let workspace = Workspace::open(workspace)?;

    // Delete the generated site folder
    let site_path = workspace.output_dir();
    if site_path == workspace.repo.base_path() {
        return Err(anyhow::anyhow!(
            "Refusing to delete the workspace itself ({})",
            site_path.display()
        ));
    }

    if site_path.exists() {
        if args.dry_run {
            println!("Would delete {}", site_path.display());
        } else {
            tokio::fs::remove_dir_all(&site_path).await?;
            println!("Deleted {}", site_path.display());
        }
    } else {
        println!("Nothing to clean");
    }

    Ok(())
}
