use clap::{crate_version, Arg, ArgAction, Command};

pub fn cli_app() -> Command {
    Command::new("admission_node")
        .display_order(0)
        .version(crate_version!())
        .about(
            "Serves the beacon node operation pool API. Slashings and voluntary exits \
             submitted over HTTP are verified against the head state, added to the \
             operation pool and published to the network.",
        )
        .arg(
            Arg::new("network")
                .long("network")
                .value_name("NETWORK")
                .help("Name of the chain configuration the node follows.")
                .value_parser(["mainnet", "minimal"])
                .default_value("mainnet")
                .action(ArgAction::Set)
                .display_order(0),
        )
        .arg(
            Arg::new("head-state")
                .long("head-state")
                .value_name("FILE")
                .help(
                    "Path to a JSON or YAML encoded beacon state to use as the head. Without \
                     it every request fails until a head state is available.",
                )
                .action(ArgAction::Set)
                .display_order(0),
        )
        /*
         * HTTP server
         */
        .arg(
            Arg::new("http-address")
                .long("http-address")
                .value_name("ADDRESS")
                .help("Set the listen address for the RESTful HTTP API server.")
                .default_value("127.0.0.1")
                .action(ArgAction::Set)
                .display_order(0),
        )
        .arg(
            Arg::new("http-port")
                .long("http-port")
                .value_name("PORT")
                .help("Set the listen TCP port for the RESTful HTTP API server.")
                .default_value("5052")
                .action(ArgAction::Set)
                .display_order(0),
        )
        .arg(
            Arg::new("http-allow-origin")
                .long("http-allow-origin")
                .value_name("ORIGIN")
                .help(
                    "Set the value of the Access-Control-Allow-Origin response HTTP header. \
                     Use * to allow any origin (not recommended in production). \
                     If no value is supplied, the CORS allowed origin is set to the listen \
                     address of this server (e.g., http://localhost:5052).",
                )
                .action(ArgAction::Set)
                .display_order(0),
        )
        .arg(
            Arg::new("disable-broadcast-slashings")
                .long("disable-broadcast-slashings")
                .help(
                    "Add submitted slashings to the operation pool without publishing them \
                     to the network. Voluntary exits are always published.",
                )
                .action(ArgAction::SetTrue)
                .display_order(0),
        )
        /*
         * Logging
         */
        .arg(
            Arg::new("debug-level")
                .long("debug-level")
                .value_name("LEVEL")
                .help("Specifies the verbosity level used when emitting logs to the terminal.")
                .value_parser(["info", "debug", "trace", "warn", "error", "crit"])
                .default_value("info")
                .action(ArgAction::Set)
                .display_order(0),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("Specifies the log format used when emitting logs to the terminal.")
                .value_parser(["TEXT", "JSON"])
                .default_value("TEXT")
                .action(ArgAction::Set)
                .display_order(0),
        )
}
