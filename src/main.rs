use chess_arbiter::api::router::create_router;
use chess_arbiter::api::state::AppState;
use chess_arbiter::config::AppConfig;

#[tokio::main]
async fn main() {
    // Container probe: exit 0/1 depending on whether /health answers.
    if std::env::args().any(|a| a == "--health-check") {
        match health_check().await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Health check failed: {e}");
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_arbiter=info,tower_http=info".into()),
        )
        .init();

    if let Err(e) = serve(AppConfig::from_env()).await {
        tracing::error!("server stopped: {e}");
        std::process::exit(1);
    }
}

async fn serve(config: AppConfig) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let max_games = config.max_games;
    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        max_games,
        "chess-arbiter v{} listening on {bind_addr}",
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(listener, app).await
}

/// Probe the local server's `/health` over a raw HTTP/1.1 request.
async fn health_check() -> Result<(), Box<dyn std::error::Error>> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let port = AppConfig::from_env().port;
    let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await?;
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await?;

    let mut head = [0u8; 64];
    let n = stream.read(&mut head).await?;
    let status_line = String::from_utf8_lossy(&head[..n]);
    let status_line = status_line.lines().next().unwrap_or_default();
    if status_line.starts_with("HTTP/1.1 200") {
        Ok(())
    } else {
        Err(format!("unexpected response: {status_line}").into())
    }
}
