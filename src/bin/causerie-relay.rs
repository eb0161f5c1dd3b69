use std::net::SocketAddr;

use clap::Parser;

use causerie::core::constants::{DEFAULT_RELAY_HOST, DEFAULT_RELAY_PORT};

#[derive(Parser)]
#[command(name = "causerie-relay")]
#[command(about = "Broadcast relay for causerie clients")]
#[command(long_about = "The relay accepts websocket connections and fans every valid \
{\"sender\", \"text\"} frame out to all connected clients. Malformed frames are dropped \
silently and per-connection failures never stop the relay; only an interrupt does.")]
struct Args {
    #[arg(long, default_value = DEFAULT_RELAY_HOST, help = "Listen address")]
    host: String,

    #[arg(long, default_value_t = DEFAULT_RELAY_PORT, help = "Listen port")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    causerie::logging::init_relay();
    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    causerie::relay::serve(addr).await
}
