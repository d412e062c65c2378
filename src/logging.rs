use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,eclick_site=debug";

/// Installs the global subscriber. `RUST_LOG` wins where the host has an
/// environment, then `directives`, then [`DEFAULT_FILTER`]. In the browser
/// every event goes to the developer console. Calling it twice is harmless.
pub fn init(directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    #[cfg(target_arch = "wasm32")]
    let _ = builder
        .without_time()
        .with_ansi(false)
        .with_writer(console::ConsoleWriter)
        .try_init();

    #[cfg(not(target_arch = "wasm32"))]
    let _ = builder.try_init();
}

/// Browser console method an event of `level` is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleChannel {
    Error,
    Warn,
    Info,
    Debug,
}

impl ConsoleChannel {
    pub fn for_level(level: &Level) -> Self {
        if *level == Level::ERROR {
            Self::Error
        } else if *level == Level::WARN {
            Self::Warn
        } else if *level == Level::INFO {
            Self::Info
        } else {
            Self::Debug
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;

    use tracing::Metadata;
    use tracing_subscriber::fmt::MakeWriter;

    use super::ConsoleChannel;

    #[derive(Debug, Default, Clone, Copy)]
    pub struct ConsoleWriter;

    /// One formatted event, sent to the console when dropped.
    pub struct ConsoleLine {
        channel: ConsoleChannel,
        buf: Vec<u8>,
    }

    impl io::Write for ConsoleLine {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleLine {
        fn drop(&mut self) {
            let line = String::from_utf8_lossy(&self.buf).trim_end().to_string();
            if line.is_empty() {
                return;
            }
            match self.channel {
                ConsoleChannel::Error => gloo_console::error!(line),
                ConsoleChannel::Warn => gloo_console::warn!(line),
                ConsoleChannel::Info => gloo_console::info!(line),
                ConsoleChannel::Debug => gloo_console::debug!(line),
            }
        }
    }

    impl<'a> MakeWriter<'a> for ConsoleWriter {
        type Writer = ConsoleLine;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleLine {
                channel: ConsoleChannel::Info,
                buf: Vec::new(),
            }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            ConsoleLine {
                channel: ConsoleChannel::for_level(meta.level()),
                buf: Vec::new(),
            }
        }
    }
}
