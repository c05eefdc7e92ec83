use std::net::SocketAddr;

use clap::Parser;
use colorsync_runtime::{run, setup_logging, RuntimeConfig};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(about = "ColorSync game runtime service")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8003")]
    host: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();
    let config = RuntimeConfig::from_env();
    let listener = TcpListener::bind(args.host).await?;
    tracing::info!(addr = %listener.local_addr()?, "game runtime listening");
    run(listener, config).await
}
