use std::path::Path;

use webportal::config::SiteSettings;
use webportal::content::FileRepository;

use crate::InitArgs;

use super::absolute;

pub async fn run(workspace: &Path, args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = absolute(workspace)?;

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    println!("Initializing workspace in {}", path.display());

    let repo = FileRepository::new(&path);
    repo.init()?;

    let settings_path = repo.settings_path();
    if settings_path.exists() {
        println!(
            "Settings file {settings_file} already exists, leaving it untouched",
            settings_file = settings_path.display()
        );
    } else {
        SiteSettings::default().save(&settings_path)?;
        println!(
            "Created settings file {settings_file}",
            settings_file = settings_path.display()
        );
    }

    println!("Next: `webportal new post --title \"Hello, World!\"`");
    Ok(())
}
