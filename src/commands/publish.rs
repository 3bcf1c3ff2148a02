use std::path::Path;

use webportal::build::{BatchReport, PublishError, Publishable, Publisher};
use webportal::content::{ContentKind, ContentRepository, Post, Project, Record, RecordId};

use crate::RecordArgs;

use super::{Workspace, print_failures};

#[derive(Clone, Copy)]
enum Action {
    Publish,
    Unpublish,
    Delete,
}

pub async fn publish(workspace: &Path, args: &RecordArgs) -> Result<(), anyhow::Error> {
    run(workspace, args, Action::Publish).await
}

pub async fn unpublish(workspace: &Path, args: &RecordArgs) -> Result<(), anyhow::Error> {
    run(workspace, args, Action::Unpublish).await
}

pub async fn delete(workspace: &Path, args: &RecordArgs) -> Result<(), anyhow::Error> {
    run(workspace, args, Action::Delete).await
}

async fn run(workspace: &Path, args: &RecordArgs, action: Action) -> Result<(), anyhow::Error> {
    let workspace = Workspace::open(workspace)?;
    let publisher = workspace.publisher()?;
    let kind = ContentKind::from(args.kind);

    let (id, result) = match kind {
        ContentKind::Post => {
            let id = find_id(&workspace.repo.list_posts()?, &args.id)?;
            (id, apply::<Post>(&publisher, id, action).await)
        }
        ContentKind::Project => {
            let id = find_id(&workspace.repo.list_projects()?, &args.id)?;
            (id, apply::<Project>(&publisher, id, action).await)
        }
    };

    let report = match result {
        Ok(report) => report,
        Err(PublishError::FileSystem { report }) => {
            print_failures(&report);
            return Err(anyhow::anyhow!(
                "{} file(s) could not be updated; nothing was changed in the store",
                report.failed.len()
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let verb = match action {
        Action::Publish => "Published",
        Action::Unpublish => "Unpublished",
        Action::Delete => "Deleted",
    };
    println!(
        "{verb} {kind} {id} ({} file(s) written, {} removed)",
        report.written.len(),
        report.removed.len()
    );
    if print_failures(&report) {
        eprintln!("Warning: some pages are out of date, run `webportal build` to retry");
    }
    Ok(())
}

async fn apply<R: Publishable>(
    publisher: &Publisher,
    id: RecordId,
    action: Action,
) -> Result<BatchReport, PublishError> {
    match action {
        Action::Publish => publisher.publish::<R>(id).await,
        Action::Unpublish => publisher.unpublish::<R>(id).await,
        Action::Delete => publisher.delete::<R>(id).await,
    }
}

/// Find the record whose id starts with `prefix`.
fn find_id<R: Record>(records: &[R], prefix: &str) -> Result<RecordId, anyhow::Error> {
    let prefix = prefix.trim().to_ascii_lowercase();
    let matches: Vec<RecordId> = records
        .iter()
        .map(|r| r.id())
        .filter(|id| {
            id.hyphenated().to_string().starts_with(&prefix)
                || id.simple().to_string().starts_with(&prefix)
        })
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(anyhow::anyhow!("No {} matches id '{prefix}'", R::KIND)),
        _ => Err(anyhow::anyhow!(
            "Id '{prefix}' matches {} {}s, use a longer prefix",
            matches.len(),
            R::KIND
        )),
    }
}
