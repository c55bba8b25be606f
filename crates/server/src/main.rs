use clap::Parser;
use rvb_server::ServerConfig;

/// The riverboat hold'em room server.
#[derive(Debug, Parser)]
#[command(name = "riverboat", about = "multi-table no-limit hold'em server")]
struct Args {
    /// Listen address (falls back to BIND_ADDR).
    #[arg(long)]
    bind: Option<String>,
    /// Allowed CORS origin; repeat for several (falls back to
    /// ALLOWED_ORIGINS, comma-separated). Empty means permissive.
    #[arg(long)]
    origin: Vec<String>,
    /// Privileged-mode shared secret (falls back to TABLE_SECRET).
    #[arg(long)]
    secret: Option<String>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> std::io::Result<()> {
    rvb_core::log();
    let args = Args::parse();
    let defaults = ServerConfig::default();
    let config = ServerConfig {
        bind: args
            .bind
            .or_else(|| std::env::var("BIND_ADDR").ok())
            .unwrap_or(defaults.bind),
        origins: if args.origin.is_empty() {
            std::env::var("ALLOWED_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default()
        } else {
            args.origin
        },
        secret: args.secret.or_else(|| std::env::var("TABLE_SECRET").ok()),
        ..defaults
    };
    rvb_server::run(config).await
}
