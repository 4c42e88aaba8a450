//! Logging Infrastructure
//!
//! `RUST_LOG` overrides the default filter. JSON output and daily-rotated
//! files are opt-in.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Default filter for the HTTP server
pub const SERVER_FILTER: &str = "motocare_server=info,tower_http=info";

/// Logger options
#[derive(Debug, Clone, Default)]
pub struct LogOptions<'a> {
    pub default_filter: &'a str,
    pub json: bool,
    pub log_dir: Option<&'a str>,
    /// File name prefix for rotated logs
    pub file_prefix: &'a str,
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
}

/// Initialize the global subscriber
pub fn init_logger(options: LogOptions<'_>) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(options.default_filter))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    // File output when the directory exists
    if let Some(dir) = options.log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, options.file_prefix);
            let builder = builder.with_ansi(false).with_writer(file_appender);
            if options.json {
                builder.json().init();
            } else {
                builder.init();
            }
            return;
        }
        eprintln!("LOG_DIR {dir} is not a directory, logging to stdout");
    }

    if options.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
