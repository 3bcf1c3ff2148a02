use std::path::Path;

use webportal::content::{ContentRepository, Record, short_id};

use super::Workspace;

pub async fn run(workspace: &Path) -> Result<(), anyhow::Error> {
    let workspace = Workspace::open(workspace)?;

    let mut posts = workspace.repo.list_posts()?;
    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    println!("Posts ({})", posts.len());
    for post in &posts {
        print_row(post);
    }

    let mut projects = workspace.repo.list_projects()?;
    projects.sort_by(|a, b| a.index_order(b));
    println!("\nProjects ({})", projects.len());
    for project in &projects {
        print_row(project);
    }

    Ok(())
}

fn print_row<R: Record>(record: &R) {
    let status = if record.is_published() { "published" } else { "draft" };
    let slug = if record.is_published() {
        record.slug().unwrap_or_default()
    } else {
        "-"
    };
    println!(
        "  {}  {:<9}  {:<24}  {}",
        short_id(&record.id()),
        status,
        slug,
        record.title()
    );
}
