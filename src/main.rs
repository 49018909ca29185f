use std::sync::Arc;

use salvo::{listener::TcpListener, Router, Server};

use user_resource::{
    app::use_case::user::UserResource,
    config::env_var::{self, UserStore},
    infra::{
        database::{connection, repository::PgUserRepository},
        memory::MemoryUserRepository,
        router,
    },
};

async fn build_router(env: &env_var::EnvVar) -> Router {
    match env.user_store {
        UserStore::Postgres => {
            let database = env
                .database
                .as_ref()
                .expect("Expect database env vars for the postgres user store");
            tracing::info!(
                host = %database.host,
                port = database.port,
                name = %database.name,
                user = %database.user,
                "connecting to postgres"
            );
            let pool = connection::create_sqlx_pool(&database.url)
                .await
                .expect("Expect to create a database pool with a open connection");
            router::app(Arc::new(UserResource::new(PgUserRepository::new(pool))))
        }
        UserStore::Memory => {
            router::app(Arc::new(UserResource::new(MemoryUserRepository::default())))
        }
    }
}

#[tokio::main]
async fn main() {
    let env = env_var::get();

    let level: tracing::Level = env.log_level.parse().expect("Invalid LOG_LEVEL");
    tracing_subscriber::fmt().with_max_level(level).init();

    let router = build_router(env).await;

    let address = format!("0.0.0.0:{}", env.port);
    tracing::info!(%address, store = ?env.user_store, "serving user api");
    let listener = TcpListener::bind(&address);
    Server::new(listener).serve(router).await;
}
