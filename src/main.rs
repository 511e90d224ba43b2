use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use metablog::{
    application::{
        authoring::{AuthoringService, NewPost},
        blog::BlogService,
        chrome::ChromeService,
        error::AppError,
        repos::{CategoriesRepo, LinksRepo, PostsRepo, TagsRepo},
        site::SiteOptions,
        syndication::SyndicationService,
    },
    config,
    domain::{
        links::{LinkBuilder, SitePaths},
        types::PostStatus,
    },
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        memory::InMemoryRepositories,
        telemetry,
    },
};
use tokio::sync::oneshot;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::Post(args) => run_post(settings, args).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    connect_database(&settings, "migrate").await?;
    info!(target = "metablog::migrate", "Migrations applied");
    Ok(())
}

async fn run_post(settings: config::Settings, args: config::PostArgs) -> Result<(), AppError> {
    let status = PostStatus::try_from(args.status.as_str())
        .map_err(|()| AppError::validation(format!("unknown post status `{}`", args.status)))?;
    let text = match args.text_file.as_ref() {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|err| AppError::from(InfraError::from(err)))?,
        None => String::new(),
    };

    let db = Arc::new(connect_database(&settings, "post").await?);
    let authoring = AuthoringService::new(db.clone(), db.clone(), db);
    let post = authoring
        .create_post(NewPost {
            author: args.author,
            title: args.title,
            text,
            status,
            post_date: None,
            tag_slugs: args.tags,
        })
        .await?;

    info!(
        target = "metablog::post",
        post_id = post.id,
        slug = %post.slug,
        "Post created"
    );
    println!("{}", post.slug);
    Ok(())
}

/// Connects to the configured database and applies pending migrations.
async fn connect_database(
    settings: &config::Settings,
    command: &str,
) -> Result<PostgresRepositories, AppError> {
    let database_url = settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| AppError::validation(format!("{command} requires a database url")))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err)))?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err)))?;

    Ok(PostgresRepositories::new(pool))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let state = build_http_state(repositories, &settings);
    serve_http(&settings, state).await
}

/// Trait-object handles onto whichever store backs the process.
struct Repositories {
    posts: Arc<dyn PostsRepo>,
    tags: Arc<dyn TagsRepo>,
    categories: Arc<dyn CategoriesRepo>,
    links: Arc<dyn LinksRepo>,
    db: Option<Arc<PostgresRepositories>>,
}

async fn init_repositories(settings: &config::Settings) -> Result<Repositories, AppError> {
    if settings.database.url.is_none() {
        warn!(
            target = "metablog::startup",
            "no database url configured; posts are kept in memory"
        );
        let memory = Arc::new(InMemoryRepositories::new());
        return Ok(Repositories {
            posts: memory.clone(),
            tags: memory.clone(),
            categories: memory.clone(),
            links: memory,
            db: None,
        });
    }

    let db = Arc::new(connect_database(settings, "serve").await?);

    Ok(Repositories {
        posts: db.clone(),
        tags: db.clone(),
        categories: db.clone(),
        links: db.clone(),
        db: Some(db),
    })
}

fn build_http_state(repositories: Repositories, settings: &config::Settings) -> HttpState {
    let options = Arc::new(SiteOptions::from(&settings.blog));
    let links: Arc<dyn LinkBuilder> = Arc::new(SitePaths::new(&settings.blog.base_path));

    let chrome = ChromeService::new(
        repositories.posts.clone(),
        repositories.tags.clone(),
        repositories.categories.clone(),
        repositories.links.clone(),
        links.clone(),
        options.clone(),
    );
    let blog = BlogService::new(
        repositories.posts.clone(),
        repositories.tags.clone(),
        chrome,
        options.clone(),
    );
    let syndication = SyndicationService::new(
        repositories.posts.clone(),
        repositories.categories.clone(),
        links,
        options,
    );
    HttpState {
        blog: Arc::new(blog),
        syndication: Arc::new(syndication),
        db: repositories.db,
    }
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "metablog::serve",
        addr = %settings.server.addr,
        "Listening"
    );

    let (stopping_tx, stopping_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stopping_tx.send(());
        })
        .into_future();

    let grace = settings.server.graceful_shutdown;
    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::from(InfraError::server(err)))?;
        }
        _ = drain_deadline(stopping_rx, grace) => {
            warn!(
                target = "metablog::serve",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
        }
    }

    info!(target = "metablog::serve", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            target = "metablog::serve",
            error = %err,
            "failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }
    info!(target = "metablog::serve", "Shutdown signal received");
}

async fn drain_deadline(stopping: oneshot::Receiver<()>, grace: Duration) {
    if stopping.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}
