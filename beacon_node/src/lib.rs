mod cli;
mod config;

pub use beacon_chain::{CanonicalHead, HeadStateProvider};
pub use cli::cli_app;
pub use config::{get_config, load_head_state, ClientConfig};
pub use http_api::{AdmissionGateway, Witness};

use network::{NetworkSender, NetworkService};
use operation_pool::OperationPool;
use slog::{debug, info, o, warn, Logger};
use state_processing::ConsensusValidator;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How often the operation pool is pruned against the current head.
pub const OP_POOL_PRUNE_INTERVAL: Duration = Duration::from_secs(384);

/// The collaborators of a production admission node.
pub type NodeTypes =
    Witness<CanonicalHead, ConsensusValidator, OperationPool, OperationPool, NetworkSender>;

/// A node which admits slashings and voluntary exits and serves the operation pool API.
///
/// The binary only ever loads one head state from disk. Embedders that follow the chain move the
/// head with `CanonicalHead::update_head`; the pool is pruned against whichever head is current.
#[derive(Clone)]
pub struct AdmissionNode {
    pub canonical_head: Arc<CanonicalHead>,
    pub op_pool: Arc<OperationPool>,
    pub http_api_listen_addr: SocketAddr,
}

impl AdmissionNode {
    /// Builds the node from `client_config` and binds the HTTP server.
    ///
    /// Must be called from within a Tokio runtime. The returned future runs the HTTP server until
    /// `shutdown` resolves.
    pub fn start(
        client_config: ClientConfig,
        shutdown: impl Future<Output = ()> + Send + Sync + 'static,
        log: &Logger,
    ) -> Result<(Self, impl Future<Output = ()>), String> {
        let spec = Arc::new(client_config.spec);

        let canonical_head = match &client_config.head_state_path {
            Some(path) => {
                let state = load_head_state(path)?;
                info!(
                    log,
                    "Loaded head state";
                    "validators" => state.validators.len(),
                    "slot" => state.slot,
                    "path" => %path.display(),
                );
                CanonicalHead::from_state(Arc::new(state), log.clone())
            }
            None => {
                warn!(
                    log,
                    "No head state provided";
                    "info" => "pool requests will fail until a head state is set",
                );
                CanonicalHead::new(log.clone())
            }
        };
        let canonical_head = Arc::new(canonical_head);

        let op_pool = Arc::new(OperationPool::new(spec.clone()));
        let (network_send, _network_handle) = NetworkService::start(log);

        let gateway = AdmissionGateway::<NodeTypes>::new(
            canonical_head.clone(),
            Arc::new(ConsensusValidator::new(spec)),
            op_pool.clone(),
            op_pool.clone(),
            Arc::new(NetworkSender::new(network_send)),
            client_config.gateway,
            log.new(o!("service" => "admission_gateway")),
        );

        let ctx = Arc::new(http_api::Context {
            config: client_config.http_api,
            gateway: Some(Arc::new(gateway)),
            log: log.new(o!("service" => "http_api")),
        });

        let (http_api_listen_addr, server) = http_api::serve(ctx, shutdown)
            .map_err(|e| format!("Unable to start HTTP API server: {:?}", e))?;

        let node = Self {
            canonical_head,
            op_pool,
            http_api_listen_addr,
        };

        let pruner = node.clone();
        let pruner_log = log.new(o!("service" => "op_pool_pruner"));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(OP_POOL_PRUNE_INTERVAL);
            loop {
                interval.tick().await;
                pruner.prune_op_pool(&pruner_log);
            }
        });

        Ok((node, server))
    }

    /// Drops pool entries that can no longer be included on top of the current head.
    ///
    /// Does nothing while there is no head state.
    pub fn prune_op_pool(&self, log: &Logger) {
        match self.canonical_head.head_state() {
            Ok(head_state) => {
                self.op_pool.prune_all(&head_state);
                debug!(
                    log,
                    "Pruned operation pool";
                    "head_slot" => head_state.slot,
                    "attester_slashings" => self.op_pool.num_attester_slashings(),
                    "proposer_slashings" => self.op_pool.num_proposer_slashings(),
                    "voluntary_exits" => self.op_pool.num_voluntary_exits(),
                );
            }
            Err(e) => debug!(
                log,
                "Skipping operation pool pruning";
                "error" => ?e,
            ),
        }
    }
}
