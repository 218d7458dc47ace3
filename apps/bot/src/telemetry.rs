use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn,hyper_util=warn";

/// JSON lines for the live bot; compact human output for `--dry-run`, where
/// the log is the only view of what the bot would have sent.
pub fn init_tracing(dry_run: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    if dry_run {
        registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .init();
        return;
    }

    registry
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(false)
                .json()
                .flatten_event(true),
        )
        .init();
}
