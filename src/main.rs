use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskdeck::auth::TokenSigner;
use taskdeck::config::Config;
use taskdeck::routes;
use taskdeck::state::AppState;
use taskdeck::store::postgres::PgStore;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "taskdeck=info".into()),
        )
        .init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Error connecting DB");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Error running migrations");

    let store = Arc::new(PgStore::new(pool));
    let state = AppState {
        users: store.clone(),
        tasks: store,
        signer: TokenSigner::new(&config.jwt_secret),
    };

    let app = routes::routes(state);

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .expect("Error binding listener");

    info!("listening on http://{}", config.addr());

    axum::serve(listener, app).await.unwrap();
}
