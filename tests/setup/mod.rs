use std::{sync::Arc, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, Url,
};
use salvo::{listener::TcpListener, Server};

use user_resource::{
    app::use_case::user::UserResource,
    infra::{memory::MemoryUserRepository, router},
};

/// Serve the user api on a free local port, backed by an empty in-memory store.
#[allow(dead_code)]
pub async fn setup_test() -> (Client, Url) {
    dotenv::dotenv().ok();
    (create_client(), spawn_service())
}

/// Postgres url from `DATABASE_URL` or the `DATABASE_*` vars, read from the env or a `.env` file.
#[allow(dead_code)]
pub fn database_url() -> Option<String> {
    dotenv::dotenv().ok();
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Some(url);
    }

    let host = std::env::var("DATABASE_HOST").ok()?;
    let name = std::env::var("DATABASE_NAME").ok()?;
    let user = std::env::var("DATABASE_USER").ok()?;
    let password = std::env::var("DATABASE_PASSWORD").ok()?;
    let port = std::env::var("DATABASE_PORT").ok()?;
    Some(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}

fn spawn_service() -> Url {
    // the os assigns a free port and the listener keeps it bound
    let listener = TcpListener::try_bind("127.0.0.1:0").expect("Expect to bind a local port");
    let port = listener.local_addr().port();
    let resource = Arc::new(UserResource::new(MemoryUserRepository::default()));
    tokio::spawn(Server::new(listener).serve(router::app(resource)));

    Url::parse(format!("http://127.0.0.1:{port}").as_str()).unwrap()
}

fn create_client() -> reqwest::Client {
    let mut headers = HeaderMap::new();
    headers.append("accept", HeaderValue::from_static("application/json"));

    let connect_timeout = 1000 * 5; // 5 sec
    let timeout = 1000 * 10; // 10 sec

    reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(connect_timeout))
        .timeout(Duration::from_millis(timeout))
        .pool_max_idle_per_host(5)
        .default_headers(headers)
        .brotli(true)
        .gzip(true)
        .build()
        .expect("Expect to create a http client")
}
