use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use geministics::app::AppContext;
use geministics::cli::{commands, Cli, Commands};
use geministics::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config, cli.db.clone());
    let password = cli.password.as_deref();

    match cli.command {
        Commands::List { kind, drafts } => {
            let session = if drafts {
                Some(ctx.admin_session(password)?)
            } else {
                None
            };
            commands::list(&ctx, kind, session.as_ref())?;
        }
        Commands::Show { id } => {
            commands::show(&ctx, &id)?;
        }
        Commands::Add(args) => {
            let session = ctx.admin_session(password)?;
            commands::add(&ctx, &session, args)?;
        }
        Commands::Edit(args) => {
            let session = ctx.admin_session(password)?;
            commands::edit(&ctx, &session, args)?;
        }
        Commands::Publish { id } => {
            let session = ctx.admin_session(password)?;
            commands::set_published(&ctx, &session, &id, true)?;
        }
        Commands::Unpublish { id } => {
            let session = ctx.admin_session(password)?;
            commands::set_published(&ctx, &session, &id, false)?;
        }
        Commands::Delete { id } => {
            let session = ctx.admin_session(password)?;
            commands::delete(&ctx, &session, &id)?;
        }
        Commands::Watch => {
            commands::watch(&ctx).await?;
        }
        Commands::Feedback { message, email } => {
            commands::feedback(&ctx, &message, email.as_deref()).await?;
        }
    }

    Ok(())
}
