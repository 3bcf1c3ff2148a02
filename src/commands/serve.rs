use std::path::Path;

use webportal::server::{ServerConfig, SiteServer};

use crate::ServeArgs;

use super::{Workspace, print_failures};

pub async fn run(workspace: &Path, args: &ServeArgs) -> Result<(), anyhow::Error> {
    let workspace = Workspace::open(workspace)?;
    let publisher = workspace.publisher()?;

    // Build the site first
    println!("Building site...");
    let report = publisher.regenerate_all().await?;
    println!("Built {} file(s)", report.written.len());
    if print_failures(&report) {
        eprintln!("Warning: some pages could not be written, serving what exists");
    }

    let mut config = ServerConfig::from_settings(&workspace.settings, workspace.output_dir());
    if let Some(bind) = &args.bind {
        config.host = bind.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let mut server = SiteServer::new(config);
    let addr = server.start().await?;

    let url = format!("http://{addr}");

    println!("\nServing {} at {}", server.config().root.display(), url);
    println!("Press Ctrl+C to stop\n");

    // Open browser if requested
    if args.open
        && let Err(e) = open::that(&url)
    {
        eprintln!("Failed to open browser: {}", e);
    }

    tokio::signal::ctrl_c().await?;
    println!("\nStopping server...");
    server.stop().await;

    Ok(())
}
