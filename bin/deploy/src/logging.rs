//! Log arguments and tracing subscriber setup.

use std::io;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::{Subscriber, level_filters::LevelFilter};
use tracing_subscriber::{
    EnvFilter, Layer, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    /// Timestamp, level, target, and spans.
    #[default]
    Full,
    /// Level and message only.
    Compact,
    /// One JSON object per event.
    Json,
}

/// Logging flags shared by every subcommand.
///
/// Deployment progress is logged at INFO, which is where the count starts.
/// Each extra `-v` past three adds detail: four shows RPC steps, five traces
/// artifact lookups. `-q` silences stderr while the result tables on stdout
/// stay.
#[derive(Debug, Clone, Parser)]
pub(crate) struct LogArgs {
    /// Verbosity: -v errors, -vv warnings, -vvv progress, -vvvv RPC steps, -vvvvv everything.
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        default_value = "3",
        env = "DEPLOY_LOG_LEVEL",
        global = true
    )]
    pub verbosity: u8,

    /// Print no log lines.
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Rendering of log lines.
    #[arg(long = "log-format", env = "DEPLOY_LOG_FORMAT", default_value = "full", global = true)]
    pub format: LogFormat,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self { verbosity: 3, quiet: false, format: LogFormat::default() }
    }
}

impl LogArgs {
    /// Level implied by the `-v` count.
    pub(crate) const fn level_filter(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::OFF,
            1 => LevelFilter::ERROR,
            2 => LevelFilter::WARN,
            3 => LevelFilter::INFO,
            4 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Installs the global subscriber. `RUST_LOG` directives win over `-v`.
    pub(crate) fn init_tracing(&self) -> eyre::Result<()> {
        let filter = EnvFilter::builder()
            .with_default_directive(self.level_filter().into())
            .from_env_lossy();

        let stderr_layer = (!self.quiet).then(|| build_stderr_layer(self.format));

        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {}", e))
    }
}

fn build_stderr_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync,
{
    let base = tracing_subscriber::fmt::layer().with_writer(io::stderr).with_ansi(true);

    match format {
        LogFormat::Full => Box::new(base),
        LogFormat::Compact => Box::new(base.compact()),
        LogFormat::Json => Box::new(base.json().with_ansi(false)),
    }
}
