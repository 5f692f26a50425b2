//! FAST market data feed client.
//!
//! Connects to the feed server and decodes updates with the FastWire
//! codec. The decoder reads from a blocking TCP stream, so it runs on the
//! blocking pool while the async main waits for it to finish.

mod common;

use common::{feed_registry, init_logging, ExampleConfig};
use fastwire::prelude::*;
use tracing::{info, warn};

/// Updates to consume before hanging up.
const MAX_UPDATES: u64 = 50;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let mut cfg = ExampleConfig::client();
    cfg.port = std::env::var("FAST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(cfg.port);

    let addr = cfg.addr();
    info!("Connecting to FAST feed at {}", addr);

    let received = tokio::task::spawn_blocking(move || consume_feed(&addr)).await??;
    info!("Feed closed after {} updates", received);
    Ok(())
}

fn consume_feed(addr: &str) -> anyhow::Result<u64> {
    let socket = std::net::TcpStream::connect(addr)?;
    let mut decoder = FastDecoder::new(socket, feed_registry());
    let mut received = 0u64;

    while let Some(update) = decoder.read_message()? {
        match read_update(&update) {
            Ok((seq, timestamp, symbol, price, size)) => {
                info!(
                    "Received: seq={} time={} symbol={} price={:.2} size={}",
                    seq, timestamp, symbol, price, size
                );
            }
            Err(e) => warn!("Malformed update: {}", e),
        }

        received += 1;
        if received >= MAX_UPDATES {
            info!("Consumed {} updates, hanging up", MAX_UPDATES);
            break;
        }
    }

    Ok(received)
}

fn read_update(update: &Message) -> anyhow::Result<(u64, String, String, f64, u32)> {
    let scalar = |name: &str| {
        update
            .scalar(name)
            .ok_or_else(|| anyhow::anyhow!("missing field {name}"))
    };

    Ok((
        scalar("Seq")?.to_u64()?,
        scalar("Timestamp")?
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scalar("Symbol")?.as_str().unwrap_or_default().to_string(),
        scalar("Price")?.to_f64()?,
        scalar("Size")?.to_u32()?,
    ))
}
