use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            let layer = fmt::layer().json().with_writer(std::io::stderr);
            if let Some(path) = &config.file_path {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                registry
                    .with(fmt::layer().json().with_writer(Arc::new(file)))
                    .init();
            } else {
                registry.with(layer).init();
            }
        }
        _ => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            if let Some(path) = &config.file_path {
                let file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)?;
                registry
                    .with(fmt::layer().with_writer(Arc::new(file)))
                    .init();
            } else {
                registry.with(layer).init();
            }
        }
    }

    Ok(())
}
