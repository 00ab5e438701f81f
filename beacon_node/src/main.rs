use beacon_node::{cli_app, get_config, AdmissionNode};
use clap::ArgMatches;
use logging::LogFormat;
use slog::{crit, info, Logger};
use std::process::exit;
use tokio::sync::oneshot;

fn main() {
    let matches = cli_app().get_matches();

    let log = match build_logger(&matches) {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Failed to initialize logger: {}", e);
            exit(1)
        }
    };

    if let Err(e) = run(&matches, &log) {
        crit!(log, "Admission node failed to start"; "reason" => e);
        // Give the async logger a moment to flush.
        std::thread::sleep(std::time::Duration::from_millis(100));
        exit(1)
    }
}

fn build_logger(matches: &ArgMatches) -> Result<Logger, String> {
    let level = matches
        .get_one::<String>("debug-level")
        .map(|level| logging::parse_level(level))
        .transpose()?
        .unwrap_or(slog::Level::Info);
    let format = matches
        .get_one::<String>("log-format")
        .map(|format| format.parse::<LogFormat>())
        .transpose()?
        .unwrap_or(LogFormat::Text);

    logging::build_logger(level, format)
}

fn run(matches: &ArgMatches, log: &Logger) -> Result<(), String> {
    let client_config = get_config(matches)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {:?}", e))?;

    runtime.block_on(async {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let signal_log = log.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                crit!(signal_log, "Unable to listen for shutdown signal"; "error" => %e);
            }
            let _ = shutdown_tx.send(());
        });

        let (node, server) = AdmissionNode::start(
            client_config,
            async {
                let _ = shutdown_rx.await;
            },
            log,
        )?;

        info!(
            log,
            "Admission node started";
            "http_address" => %node.http_api_listen_addr,
        );

        server.await;

        info!(
            log,
            "Shutting down";
            "pooled_voluntary_exits" => node.op_pool.num_voluntary_exits(),
            "pooled_proposer_slashings" => node.op_pool.num_proposer_slashings(),
            "pooled_attester_slashings" => node.op_pool.num_attester_slashings(),
        );

        Ok(())
    })
}
