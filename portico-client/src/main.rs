use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Target};
use log::LevelFilter;
use portico_client::cli::{self, Cli};

const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;
const CLIENT_LEVEL: LevelFilter = LevelFilter::Debug;

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(DEFAULT_LEVEL)
        .filter_module("portico_client", CLIENT_LEVEL)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let cli = Cli::parse();
    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_logs_are_more_verbose_than_dependencies() {
        assert_eq!(DEFAULT_LEVEL, LevelFilter::Warn);
        assert_eq!(CLIENT_LEVEL, LevelFilter::Debug);
    }
}
