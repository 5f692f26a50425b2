//! Shared helpers for the FAST feed examples.

#![allow(dead_code)]

use chrono::Utc;
use fastwire::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Host/port pair the examples agree on.
pub struct ExampleConfig {
    pub host: String,
    pub port: u16,
}

impl ExampleConfig {
    pub fn server() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9890,
        }
    }

    pub fn client() -> Self {
        Self::server()
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Initializes tracing with `RUST_LOG` overrides, defaulting to `info`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

/// Current UTC time in FIX timestamp format.
pub fn format_timestamp() -> String {
    Utc::now().format("%Y%m%d-%H:%M:%S%.3f").to_string()
}

/// The market data template both sides of the feed agree on.
///
/// Operator choices show the protocol off: the sequence number rides the
/// increment operator (zero bytes per message), the symbol rides copy,
/// the timestamp and price ride deltas against the previous update.
pub fn feed_registry() -> Arc<BasicTemplateRegistry> {
    let template = MessageTemplate::new("MarketData")
        .with_field(Scalar::new("Seq", FastType::U64, Operator::Increment, false))
        .with_field(Scalar::new("Timestamp", FastType::Ascii, Operator::Delta, false))
        .with_field(Scalar::new("Symbol", FastType::Ascii, Operator::Copy, false))
        .with_field(Scalar::new("Price", FastType::Decimal, Operator::Delta, false))
        .with_field(Scalar::new("Size", FastType::U32, Operator::None, false));

    let mut registry = BasicTemplateRegistry::new();
    registry
        .register(1, template)
        .expect("feed template is statically valid");
    Arc::new(registry)
}
