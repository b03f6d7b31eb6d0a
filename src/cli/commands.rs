use std::path::Path;

use tracing::info;

use crate::app::{AppContext, Result, SiteError};
use crate::auth::AdminSession;
use crate::cli::{AddArgs, EditArgs};
use crate::domain::{ContentItem, ContentPatch, ContentType, NewContent};
use crate::media;

pub fn list(
    ctx: &AppContext,
    kind: Option<ContentType>,
    drafts: Option<&AdminSession>,
) -> Result<()> {
    if let Some(session) = drafts {
        session.require()?;
        let items: Vec<ContentItem> = ctx
            .store
            .get_all()
            .into_iter()
            .filter(|item| kind.map_or(true, |k| item.kind == k))
            .collect();
        print_items(&items);
        return Ok(());
    }

    let kinds = match kind {
        Some(kind) => vec![kind],
        None => ContentType::ALL.to_vec(),
    };

    for kind in kinds {
        let items = ctx.store.get_by_type(kind);
        println!("{} ({})", kind, items.len());
        print_items(&items);
    }

    Ok(())
}

pub fn show(ctx: &AppContext, id: &str) -> Result<()> {
    let item = ctx
        .store
        .get_by_id(id)
        .ok_or_else(|| SiteError::ContentNotFound(id.to_string()))?;

    println!("{}", item.title);
    println!("  id:     {}", item.id);
    println!("  type:   {}", item.kind);
    println!("  date:   {}", item.date);
    println!(
        "  status: {}",
        if item.published { "published" } else { "draft" }
    );
    if let Some(ref image) = item.image {
        println!("  image:  {} bytes embedded", image.len());
    }
    println!();
    println!("{}", item.content);
    Ok(())
}

pub fn add(ctx: &AppContext, session: &AdminSession, args: AddArgs) -> Result<()> {
    session.require()?;

    let body = read_body(args.content, args.file.as_deref())?.unwrap_or_default();
    let mut new = NewContent::new(args.kind, args.title, body);
    new.published = !args.draft;
    if let Some(ref path) = args.image {
        new.image = Some(media::image_data_uri(path)?);
    }

    let item = ctx.store.add(new)?;
    println!("Added {}: {} ({})", item.kind, item.title, item.id);
    Ok(())
}

pub fn edit(ctx: &AppContext, session: &AdminSession, args: EditArgs) -> Result<()> {
    session.require()?;

    let id = args.id.clone();
    let patch = edit_patch(args)?;
    if patch.is_empty() {
        println!("Nothing to change");
        return Ok(());
    }

    let item = ctx
        .store
        .update(&id, patch)?
        .ok_or(SiteError::ContentNotFound(id))?;
    println!("Updated {}: {} ({})", item.kind, item.title, item.id);
    Ok(())
}

pub fn set_published(
    ctx: &AppContext,
    session: &AdminSession,
    id: &str,
    published: bool,
) -> Result<()> {
    session.require()?;

    let item = ctx
        .store
        .update(id, ContentPatch::published(published))?
        .ok_or_else(|| SiteError::ContentNotFound(id.to_string()))?;

    let state = if item.published { "Published" } else { "Unpublished" };
    println!("{}: {}", state, item.title);
    Ok(())
}

pub fn delete(ctx: &AppContext, session: &AdminSession, id: &str) -> Result<()> {
    session.require()?;

    if !ctx.store.delete(id)? {
        return Err(SiteError::ContentNotFound(id.to_string()));
    }
    println!("Deleted: {}", id);
    Ok(())
}

/// Print the published listing, then again whenever another instance changes it.
pub async fn watch(ctx: &AppContext) -> Result<()> {
    let Some(handle) = ctx.spawn_sync() else {
        return Err(SiteError::Config(
            "watch needs persistent storage, none could be opened".into(),
        ));
    };

    list(ctx, None, None)?;

    let store = ctx.store.clone();
    let subscription = ctx.store.subscribe(move || {
        println!("\n-- content reloaded ({} items) --", store.len());
        for kind in ContentType::ALL {
            let items = store.get_by_type(kind);
            println!("{} ({})", kind, items.len());
            print_items(&items);
        }
    });

    info!("Watching for content changes, Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    subscription.unsubscribe();
    handle.shutdown().await;
    ctx.store.dispose();
    Ok(())
}

pub async fn feedback(ctx: &AppContext, message: &str, email: Option<&str>) -> Result<()> {
    let forwarder = ctx.feedback_forwarder()?;
    let receipt = forwarder.submit(message, email).await?;
    println!("{}", receipt.message);
    Ok(())
}

fn print_items(items: &[ContentItem]) {
    if items.is_empty() {
        println!("  No content");
        return;
    }

    for item in items {
        let date = item
            .timestamp()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        let draft = if item.published { "" } else { " [draft]" };
        let image = if item.has_image() { " [image]" } else { "" };

        println!(
            "  {} {:<7} {}  ({}){}{}",
            date,
            item.kind.as_str(),
            item.title,
            item.id,
            draft,
            image
        );
    }
}

fn read_body(content: Option<String>, file: Option<&Path>) -> Result<Option<String>> {
    match (content, file) {
        (Some(content), _) => Ok(Some(content)),
        (None, Some(path)) => Ok(Some(std::fs::read_to_string(path)?)),
        (None, None) => Ok(None),
    }
}

fn edit_patch(args: EditArgs) -> Result<ContentPatch> {
    let image = if args.remove_image {
        Some(None)
    } else {
        args.image
            .as_deref()
            .map(media::image_data_uri)
            .transpose()?
            .map(Some)
    };

    Ok(ContentPatch {
        kind: args.kind,
        title: args.title,
        content: read_body(args.content, args.file.as_deref())?,
        date: args.date,
        published: None,
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::config::Config;

    fn edit_args(id: &str) -> EditArgs {
        EditArgs {
            id: id.to_string(),
            kind: None,
            title: None,
            content: None,
            file: None,
            date: None,
            image: None,
            remove_image: false,
        }
    }

    fn admin_ctx() -> (AppContext, AdminSession) {
        let mut config = Config::default();
        config.admin.password_sha256 = Some(hash_password("pw"));
        let ctx = AppContext::in_memory(config);
        let session = ctx.admin_session(Some("pw")).unwrap();
        (ctx, session)
    }

    #[test]
    fn test_edit_patch_only_carries_given_fields() {
        let mut args = edit_args("1");
        args.title = Some("New title".into());

        let patch = edit_patch(args).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New title"));
        assert!(patch.content.is_none());
        assert!(patch.image.is_none());
        assert!(edit_patch(edit_args("1")).unwrap().is_empty());
    }

    #[test]
    fn test_edit_patch_remove_image() {
        let mut args = edit_args("1");
        args.remove_image = true;
        assert_eq!(edit_patch(args).unwrap().image, Some(None));
    }

    #[test]
    fn test_read_body_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poem.txt");
        std::fs::write(&path, "line one\nline two").unwrap();

        let body = read_body(None, Some(&path)).unwrap();
        assert_eq!(body.as_deref(), Some("line one\nline two"));
        assert_eq!(read_body(None, None).unwrap(), None);
    }

    #[test]
    fn test_admin_commands_change_store() {
        let (ctx, session) = admin_ctx();

        set_published(&ctx, &session, "1", false).unwrap();
        assert!(!ctx.store.get_by_id("1").unwrap().published);

        delete(&ctx, &session, "2").unwrap();
        assert!(ctx.store.get_by_id("2").is_none());
        assert!(matches!(
            delete(&ctx, &session, "2"),
            Err(SiteError::ContentNotFound(_))
        ));
    }

    #[test]
    fn test_logged_out_session_is_refused() {
        let (ctx, mut session) = admin_ctx();
        session.logout();

        assert!(matches!(
            delete(&ctx, &session, "1"),
            Err(SiteError::Unauthorized)
        ));
        assert!(ctx.store.get_by_id("1").is_some());
    }

    #[test]
    fn test_list_drafts_needs_logged_in_session() {
        let (ctx, mut session) = admin_ctx();
        assert!(list(&ctx, Some(ContentType::Poem), Some(&session)).is_ok());
        assert!(list(&ctx, None, None).is_ok());

        session.logout();
        assert!(matches!(
            list(&ctx, None, Some(&session)),
            Err(SiteError::Unauthorized)
        ));
    }

    #[test]
    fn test_show_unknown_id() {
        let (ctx, _) = admin_ctx();
        assert!(matches!(
            show(&ctx, "missing"),
            Err(SiteError::ContentNotFound(_))
        ));
    }
}
