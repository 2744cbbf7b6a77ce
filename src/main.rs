use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursecraft::{
    config::Config,
    db,
    routes,
    state::AppState,
    store::{CourseStore, MemoryCourseStore, PgCourseStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "coursecraft=info,axum=info,tower_http=info".into())
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn CourseStore> = match config.database_url.as_deref() {
        Some(url) => Arc::new(PgCourseStore::new(db::connect(url).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set; courses are kept in memory and lost on exit");
            Arc::new(MemoryCourseStore::new())
        }
    };

    let app = routes::app(AppState::new(store, config.jwt.clone()), config.body_limit);

    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
