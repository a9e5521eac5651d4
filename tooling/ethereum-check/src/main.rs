use clap::{CommandFactory, Parser, error::ErrorKind};
use ethereum_check::{
    client::HttpEthClient,
    config::{CheckConfig, Options},
    models::CheckOutcome,
    report::Report,
    service::run_checks,
};
use std::{
    io::{self, IsTerminal},
    process,
    time::SystemTime,
};
use tracing::{Level, error, info};
use tracing_subscriber::{EnvFilter, filter::Directive};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let options = match Options::try_parse() {
        Ok(options) => options,
        Err(error) => exit_on_usage_error(error),
    };
    init_tracing(options.log_level);

    let config = CheckConfig::from(&options);
    let report = run(&config).await;

    println!("{}", report.render());
    process::exit(report.exit_code());
}

async fn run(config: &CheckConfig) -> Report {
    let client = match config.rpc_timeout {
        Some(timeout) => match HttpEthClient::with_timeout(config.rpc_url.clone(), timeout) {
            Ok(client) => client,
            Err(error) => {
                error!(error = %error, "failed to build rpc client");
                return Report::from(CheckOutcome::critical(format!(
                    "CRITICAL: failed to initialize RPC client: {error}"
                )));
            }
        },
        None => HttpEthClient::new(config.rpc_url.clone()),
    };

    info!(
        rpc_url = %config.rpc_url,
        liveness = config.liveness.is_some(),
        "running checks"
    );
    run_checks(&client, config, SystemTime::now()).await
}

/// Logs go to stderr; stdout is reserved for status lines.
fn init_tracing(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(Directive::from(level))
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// Usage errors print the help on stdout and the error on stderr, then exit 1.
fn exit_on_usage_error(error: clap::Error) -> ! {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            process::exit(0);
        }
        _ => {
            println!("{}", Options::command().render_help());
            let _ = error.print();
            process::exit(1);
        }
    }
}
