use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pulpit::app::AppContext;
use pulpit::cli::{commands, CacheAction, Cli, Commands};
use pulpit::config::Config;
use pulpit::platform::PlatformKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_or_create(path)?,
        None => Config::load()?,
    };
    if cli.native {
        config.platform.kind = PlatformKind::Native;
    }

    let ctx = AppContext::new(config, cli.db)?;
    ctx.network.set_online(!cli.offline);
    ctx.restore_session()?;

    ctx.on_logout(|| eprintln!("Session expired, please log in again"));

    let result = run(&ctx, cli.command).await;

    // Runs even when the command failed, so a cleared token is not restored.
    ctx.persist_session()?;

    Ok(result?)
}

async fn run(ctx: &AppContext, command: Commands) -> pulpit::app::Result<()> {
    match command {
        Commands::Get { endpoint, refresh } => commands::get(ctx, &endpoint, refresh).await,
        Commands::List {
            family,
            page,
            limit,
        } => commands::list(ctx, &family, page, limit).await,
        Commands::Search { query, kind } => commands::search(ctx, &query, kind.as_deref()).await,
        Commands::Login { email, password } => commands::login(ctx, &email, password).await,
        Commands::Logout => commands::logout(ctx),
        Commands::Upload {
            endpoint,
            file,
            field,
        } => commands::upload(ctx, &endpoint, &file, &field).await,
        Commands::Prefetch => commands::prefetch(ctx).await,
        Commands::Cache { action } => match action {
            CacheAction::List => commands::cache_list(ctx),
            CacheAction::Clear { family } => commands::cache_clear(ctx, family.as_deref()),
        },
    }
}
