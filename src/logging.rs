use std::env;
use std::io;
use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::{Compact, DefaultFields, Format};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Log file used when `RUST_LOG_FILE` is unset.
pub const DEFAULT_LOG_FILE: &str = "logs/wireview.log";

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Compact formatter with source location; ANSI colors only for terminals.
fn compact_layer<S, W>(writer: W, ansi: bool) -> fmt::Layer<S, DefaultFields, Format<Compact>, W>
where
    W: for<'writer> MakeWriter<'writer> + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
}

/// Installs stderr and daily-rolling file logging plus a panic hook.
/// Calling it twice is harmless; the second subscriber is rejected.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_path = env::var("RUST_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let log_path = Path::new(&log_path);
    let directory = log_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let file_name = log_path.file_name().unwrap_or(std::ffi::OsStr::new("wireview.log"));
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, file_name));
    let _ = FILE_GUARD.set(guard);

    if tracing_subscriber::registry()
        .with(filter)
        .with(compact_layer(io::stderr, true))
        .with(compact_layer(file_writer, false))
        .try_init()
        .is_err()
    {
        return;
    }

    std::panic::set_hook(Box::new(|info| {
        let mut msg = String::new();
        if let Some(loc) = info.location() {
            msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
        }
        if let Some(s) = info.payload().downcast_ref::<&str>() {
            msg.push_str(s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            msg.push_str(s);
        } else {
            msg.push_str("<non-string panic>");
        }
        let bt = std::backtrace::Backtrace::force_capture();
        tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
    }));
}
