//! Logging setup and the `log_metric!` diagnostics hook.
//!
//! The library itself only emits through the `log` facade. Applications that
//! want to see those records either install their own logger or call
//! `enable_verbose_logging` once at startup.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Once;

use colored::Colorize;
use log::{Level, LevelFilter};

use crate::error::Result;

/// Logs a structured key-value metric string to stdout, only in debug builds.
///
/// # Example
/// ```
/// use feather_bridge::log_metric;
/// let rows = 3;
/// log_metric!("event" = "append_column", "rows" = &rows);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            let output = format!("FEATHER_METRIC: {{ {} }}", parts.join(", "));
            println!("{}", output);
        }
    };
}

static INIT_LOGGER: Once = Once::new();

fn colored_level(level: Level) -> colored::ColoredString {
    let tag = level.as_str();
    match level {
        Level::Error => tag.red().bold(),
        Level::Warn => tag.yellow(),
        Level::Info => tag.green(),
        Level::Debug => tag.blue(),
        Level::Trace => tag.dimmed(),
    }
}

/// Installs an `env_logger` at `level`, optionally appending to `log_file`.
///
/// Only the first call installs anything; later calls are no-ops. If another
/// logger is already registered the call succeeds without replacing it.
pub fn enable_verbose_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
    let target = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();
        builder.is_test(false);
        builder.filter_level(level);

        let to_file = target.is_some();
        builder.format(move |buf, record| {
            if to_file {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            } else {
                writeln!(buf, "[{}] {}", colored_level(record.level()), record.args())
            }
        });

        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
