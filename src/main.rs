use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webportal::content::ContentKind;

mod commands;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The workspace directory holding portal.json and the content
    #[arg(short, long, global = true, default_value = ".")]
    workspace: PathBuf,

    /// The command to execute
    #[command(subcommand)]
    command: PortalCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// Whether to create the workspace directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// The loopback address to bind to (defaults to the `host` setting)
    #[arg(short, long)]
    bind: Option<String>,

    /// The port to bind to (defaults to the `server_port` setting)
    #[arg(short, long)]
    port: Option<u16>,

    /// Open the site in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,
}

#[derive(Parser)]
struct NewArgs {
    /// What to create
    kind: KindArg,

    /// Title of the new record
    #[arg(short, long)]
    title: String,

    /// Subtitle of the new record
    #[arg(short, long)]
    subtitle: Option<String>,

    /// Plain text body; blank lines separate paragraphs
    #[arg(long)]
    body: Option<String>,

    /// Image file to attach
    #[arg(short, long)]
    image: Option<PathBuf>,
}

#[derive(Parser)]
struct RecordArgs {
    /// Kind of the record
    kind: KindArg,

    /// Record id, or an unambiguous prefix of it
    id: String,
}

#[derive(Parser)]
struct CleanArgs {
    /// Only print what would be deleted
    #[arg(short, long, default_value = "false")]
    dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Post,
    Project,
}

impl From<KindArg> for ContentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Post => ContentKind::Post,
            KindArg::Project => ContentKind::Project,
        }
    }
}

#[derive(Subcommand)]
enum PortalCommand {
    /// Initialize a new workspace
    Init(InitArgs),

    /// Regenerate the whole site
    Build,

    /// Build the site and serve it on a local port
    Serve(ServeArgs),

    /// Create a new draft post or project
    New(NewArgs),

    /// List posts and projects
    List,

    /// Publish a draft
    Publish(RecordArgs),

    /// Take a published record off the site
    Unpublish(RecordArgs),

    /// Delete a record and its pages
    Delete(RecordArgs),

    /// Remove the generated site
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webportal=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let workspace = &args.workspace;

    match args.command {
        PortalCommand::Init(args) => {
            commands::init::run(workspace, &args).await?;
        }
        PortalCommand::Build => {
            commands::build::run(workspace).await?;
        }
        PortalCommand::Serve(args) => {
            commands::serve::run(workspace, &args).await?;
        }
        PortalCommand::New(args) => {
            commands::new::run(workspace, &args).await?;
        }
        PortalCommand::List => {
            commands::list::run(workspace).await?;
        }
        PortalCommand::Publish(args) => {
            commands::publish::publish(workspace, &args).await?;
        }
        PortalCommand::Unpublish(args) => {
            commands::publish::unpublish(workspace, &args).await?;
        }
        PortalCommand::Delete(args) => {
            commands::publish::delete(workspace, &args).await?;
        }
        PortalCommand::Clean(args) => {
            commands::clean::run(workspace, &args).await?;
        }
    }

    Ok(())
}
