use std::net::SocketAddr;

use clap::Parser;
use colorsync_matchmaker::{run, setup_logging, MatchmakerConfig};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(about = "ColorSync matchmaker service")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8002")]
    host: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();
    let config = MatchmakerConfig::from_env();
    let listener = TcpListener::bind(args.host).await?;
    tracing::info!(addr = %listener.local_addr()?, "matchmaker listening");
    run(listener, config).await
}
