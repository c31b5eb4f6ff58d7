use clap::Parser;
use redchat::config::Config;
use redchat::daemon;
use redchat::error::Result;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "redchatd")]
#[command(about = "redchat messaging daemon")]
struct Cli {
    #[arg(long, env = "REDCHAT_CONFIG")]
    config: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long, env = "REDCHAT_REDIS_URL")]
    redis_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.redis_url {
        config.redis.url = url;
    }

    let default_filter = config
        .log
        .level
        .clone()
        .unwrap_or_else(|| "info,redchat=info".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    daemon::run(config).await
}
