use std::path::Path;

use chrono::Utc;

use webportal::content::{
    ContentKind, ContentRepository, MarkupConverter, ParagraphConverter, Post, Project, short_id,
};

use crate::NewArgs;

use super::{Workspace, absolute};

pub async fn run(workspace: &Path, args: &NewArgs) -> Result<(), anyhow::Error> {
    let workspace = Workspace::open(workspace)?;
    let converter = ParagraphConverter;
    let markup = converter.to_markup(args.body.as_deref().unwrap_or_default());

    let image = match &args.image {
        Some(path) => Some(tokio::fs::read(absolute(path)?).await?),
        None => None,
    };

    let now = Utc::now();
    let (kind, id) = match ContentKind::from(args.kind) {
        ContentKind::Post => {
            let mut post = Post::new(&args.title, &workspace.settings.author, now);
            post.subtitle = args.subtitle.clone().unwrap_or_default();
            post.body = markup;
            post.image = image;
            workspace.repo.save_post(&post)?;
            (ContentKind::Post, post.id)
        }
        ContentKind::Project => {
            // New projects go to the end of the portfolio
            let display_order = workspace
                .repo
                .list_projects()?
                .iter()
                .map(|p| p.display_order)
                .max()
                .map_or(0, |max| max + 1);
            let mut project = Project::new(&args.title, display_order, now);
            project.subtitle = args.subtitle.clone().unwrap_or_default();
            project.description = markup;
            project.image = image;
            workspace.repo.save_project(&project)?;
            (ContentKind::Project, project.id)
        }
    };

    println!("Created draft {kind} {} ({id})", short_id(&id));
    println!("Publish it with `webportal publish {kind} {}`", short_id(&id));
    Ok(())
}
