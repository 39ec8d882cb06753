//! Tracing subscriber setup: text for development, JSON lines otherwise.

use std::path::Path;
use tasknudge_core::config::NudgeConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when `RUST_LOG` is not set.
fn default_directive(cfg: &NudgeConfig) -> &str {
    if cfg.dev {
        "debug"
    } else {
        cfg.log_level.as_str()
    }
}

/// Install the global subscriber. Keep the returned guard alive so the log
/// file is flushed on exit.
pub fn init(cfg: &NudgeConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(cfg)));

    let (file_writer, guard) = if cfg.log_file.is_empty() {
        (None, None)
    } else {
        let path = Path::new(&cfg.log_file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("log_file '{}' has no file name", cfg.log_file))?;
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
        (Some(writer), Some(guard))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if cfg.dev {
        registry
            .with(fmt::layer())
            .with(file_writer.map(|w| fmt::layer().with_ansi(false).with_writer(w)))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().json())
            .with(file_writer.map(|w| fmt::layer().json().with_writer(w)))
            .try_init()?;
    }

    Ok(guard)
}
