// --- Exam Scheduling Platform - entry point ---

use examplan::run_server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Exam Scheduling Platform (API) ===");
    let bind = std::env::var("EXAMPLAN_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    println!("Listening on http://{}", bind);
    run_server(&bind).await
}
