use clap::ArgMatches;
use http_api::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use types::{BeaconState, ChainSpec};

/// The core configuration of an admission node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub spec: ChainSpec,
    /// A state to install as the head on startup.
    pub head_state_path: Option<PathBuf>,
    pub http_api: http_api::Config,
    pub gateway: GatewayConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            spec: ChainSpec::mainnet(),
            head_state_path: None,
            http_api: <_>::default(),
            gateway: <_>::default(),
        }
    }
}

/// Gets the fully-initialized global client.
///
/// The top-level `clap` arguments should be provided as `cli_args`.
pub fn get_config(cli_args: &ArgMatches) -> Result<ClientConfig, String> {
    let mut client_config = ClientConfig::default();

    if let Some(network) = cli_args.get_one::<String>("network") {
        client_config.spec = ChainSpec::from_str(network)?;
    }

    client_config.head_state_path = cli_args.get_one::<String>("head-state").map(PathBuf::from);

    /*
     * Http API server
     */
    client_config.http_api.enabled = true;

    if let Some(address) = cli_args.get_one::<String>("http-address") {
        client_config.http_api.listen_addr = address
            .parse::<IpAddr>()
            .map_err(|_| "http-address is not a valid IP address.")?;
    }

    if let Some(port) = cli_args.get_one::<String>("http-port") {
        client_config.http_api.listen_port = port
            .parse::<u16>()
            .map_err(|_| "http-port is not a valid u16.")?;
    }

    if let Some(allow_origin) = cli_args.get_one::<String>("http-allow-origin") {
        client_config.http_api.allow_origin = Some(allow_origin.to_string());
    }

    client_config.gateway.disable_broadcast_slashings =
        cli_args.get_flag("disable-broadcast-slashings");

    Ok(client_config)
}

/// Loads a beacon state from `path`, decoding it as YAML if the extension says so and as JSON
/// otherwise.
pub fn load_head_state(path: &Path) -> Result<BeaconState, String> {
    let file = File::open(path)
        .map_err(|e| format!("Unable to open head state {}: {}", path.display(), e))?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_reader(file)
            .map_err(|e| format!("Unable to parse head state {}: {}", path.display(), e)),
        _ => serde_json::from_reader(file)
            .map_err(|e| format!("Unable to parse head state {}: {}", path.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_app;
    use beacon_chain::test_utils::StateHarness;
    use std::io::Write;
    use std::net::Ipv4Addr;

    fn config_from(args: &[&str]) -> Result<ClientConfig, String> {
        let matches = cli_app()
            .try_get_matches_from(std::iter::once("admission_node").chain(args.iter().copied()))
            .map_err(|e| e.to_string())?;
        get_config(&matches)
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.spec, ChainSpec::mainnet());
        assert_eq!(config.head_state_path, None);
        assert!(config.http_api.enabled);
        assert_eq!(
            config.http_api.listen_addr,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.http_api.listen_port, 5052);
        assert!(!config.gateway.disable_broadcast_slashings);
    }

    #[test]
    fn flags() {
        let config = config_from(&[
            "--network",
            "minimal",
            "--http-address",
            "0.0.0.0",
            "--http-port",
            "6000",
            "--http-allow-origin",
            "*",
            "--head-state",
            "/tmp/state.json",
            "--disable-broadcast-slashings",
        ])
        .unwrap();

        assert_eq!(config.spec, ChainSpec::minimal());
        assert_eq!(config.http_api.listen_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.http_api.listen_port, 6000);
        assert_eq!(config.http_api.allow_origin, Some("*".to_string()));
        assert_eq!(config.head_state_path, Some(PathBuf::from("/tmp/state.json")));
        assert!(config.gateway.disable_broadcast_slashings);
    }

    #[test]
    fn invalid_flags() {
        assert!(config_from(&["--http-address", "localhost:5052"]).is_err());
        assert!(config_from(&["--http-port", "70000"]).is_err());
        assert!(config_from(&["--network", "holesky"]).is_err());
    }

    #[test]
    fn loads_json_and_yaml_states() {
        let state = StateHarness::new(4).state;
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("state.json");
        File::create(&json_path)
            .unwrap()
            .write_all(serde_json::to_string(&state).unwrap().as_bytes())
            .unwrap();
        assert_eq!(load_head_state(&json_path).unwrap(), state);

        let yaml_path = dir.path().join("state.yaml");
        File::create(&yaml_path)
            .unwrap()
            .write_all(serde_yaml::to_string(&state).unwrap().as_bytes())
            .unwrap();
        assert_eq!(load_head_state(&yaml_path).unwrap(), state);

        assert!(load_head_state(&dir.path().join("missing.json")).is_err());
    }
}
