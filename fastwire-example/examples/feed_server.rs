//! FAST market data feed server.
//!
//! Encodes a stream of simulated market data updates with the FastWire
//! codec and pushes them to every connected client over TCP. Each client
//! gets its own encoder, so dictionary state never crosses connections.

mod common;

use common::{feed_registry, format_timestamp, init_logging, ExampleConfig};
use fastwire::prelude::*;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let mut cfg = ExampleConfig::server();
    cfg.port = std::env::var("FAST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(cfg.port);

    let listener: TcpListener = TcpListener::bind(cfg.addr()).await?;
    info!("FAST feed listening on {}", cfg.addr());

    loop {
        let (socket, peer) = listener.accept().await?;
        info!("Client connected: {}", peer);

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket).await {
                error!("Client error: {}", e);
            }
            info!("Client disconnected: {}", peer);
        });
    }
}

async fn handle_client(mut socket: TcpStream) -> anyhow::Result<()> {
    let registry = feed_registry();
    let template = registry
        .template_by_name(&QName::new("MarketData"))
        .expect("feed template is registered");
    let mut encoder = FastEncoder::new(
        Vec::new(),
        Arc::clone(&registry) as Arc<dyn TemplateRegistry>,
    );

    let symbols = ["AAPL", "GOOGL", "MSFT", "AMZN", "META"];
    let mut prices: Vec<i64> = vec![15000, 14000, 38000, 17500, 50000];
    let mut seq: u64 = 1;
    let mut ticker = interval(Duration::from_millis(100));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let idx = (seq as usize) % symbols.len();

                // Simulated price movement in whole cents.
                prices[idx] += (seq % 10) as i64 - 5;
                let size = 100 + (seq % 900) as u32;

                let mut update = Message::new(Arc::clone(&template));
                update.set("Seq", seq)?;
                update.set("Timestamp", format_timestamp())?;
                update.set("Symbol", symbols[idx])?;
                update.set("Price", DecimalValue::new(prices[idx], -2))?;
                update.set("Size", size)?;

                encoder.write_message(&update)?;
                let frame = std::mem::take(encoder.get_mut());
                if let Err(e) = socket.write_all(&frame).await {
                    warn!("Write error: {}", e);
                    break;
                }

                info!(
                    "Sent: seq={} symbol={} price={}.{:02} size={} ({} bytes)",
                    seq,
                    symbols[idx],
                    prices[idx] / 100,
                    prices[idx] % 100,
                    size,
                    frame.len()
                );
                seq += 1;
            }
            result = socket.readable() => {
                if result.is_err() {
                    break;
                }
                let mut buf = [0u8; 1];
                match socket.try_read(&mut buf) {
                    Ok(0) => {
                        info!("Client closed connection");
                        break;
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
                    Err(e) => {
                        warn!("Read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}
