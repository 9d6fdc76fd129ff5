mod config;
mod distribution;
mod summary;

use config::{Config, ResolveError};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args_os();
    let program = args
        .next()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "fmm-args".to_string());

    let cfg = match Config::resolve(&program, args) {
        Ok(c) => c,
        Err(ResolveError::Usage(in_effect)) => {
            eprint!("{}", summary::usage(&program, &in_effect));
            std::process::exit(0);
        }
        Err(e @ ResolveError::InvalidDistribution(_)) => {
            eprintln!("{}", e);
            std::process::abort();
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    print!("{}", summary::render(&cfg, summary::DEFAULT_WIDTH));
}
