//! This crate contains a HTTP server which serves the beacon node's operation pool endpoints.
//!
//! ## Notes
//!
//! The pool endpoints are synchronous all the way down: each request is handed to a Tokio
//! blocking thread which runs the `AdmissionGateway` and returns its result as JSON.

mod gateway;
mod metrics;

pub use gateway::{
    AdmissionGateway, Error as GatewayError, ErrorClass, GatewayConfig, GatewayTypes,
    InvalidObject, ObjectKind, Witness,
};

use eth2::types::{self as api_types, GenericResponse};
use serde::{Deserialize, Serialize};
use slog::{crit, debug, info, Logger};
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use warp::Filter;
use warp_utils::reject::{custom_bad_request, custom_server_error, object_invalid};
use warp_utils::task::{blocking_json_task, blocking_response_task};

#[derive(Debug)]
pub enum Error {
    Warp(warp::Error),
    Other(String),
}

impl From<warp::Error> for Error {
    fn from(e: warp::Error) -> Self {
        Error::Warp(e)
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

/// Configuration for the HTTP server.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub enabled: bool,
    pub listen_addr: IpAddr,
    pub listen_port: u16,
    pub allow_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            listen_port: 5052,
            allow_origin: None,
        }
    }
}

/// A wrapper around all the items required to spawn the HTTP server.
///
/// Requests are answered with a server error while `gateway` is `None`.
pub struct Context<T: GatewayTypes> {
    pub config: Config,
    pub gateway: Option<Arc<AdmissionGateway<T>>>,
    pub log: Logger,
}

/// Maps a gateway error onto the rejection the client will see.
fn reject(e: GatewayError) -> warp::Rejection {
    let message = e.to_string();
    match (e.class(), e) {
        (ErrorClass::InvalidRequest, GatewayError::InvalidObject(_)) => object_invalid(message),
        (ErrorClass::InvalidRequest, _) => custom_bad_request(message),
        (ErrorClass::Internal, _) => custom_server_error(message),
    }
}

/// A `warp` logging filter which logs each request with `slog`.
pub fn slog_logging(
    log: Logger,
) -> warp::filters::log::Log<impl Fn(warp::filters::log::Info) + Clone> {
    warp::log::custom(move |info| {
        match info.status() {
            status
                if status == warp::http::StatusCode::OK
                    || status == warp::http::StatusCode::NOT_FOUND =>
            {
                debug!(
                    log,
                    "Processed HTTP API request";
                    "elapsed" => format!("{:?}", info.elapsed()),
                    "status" => status.to_string(),
                    "path" => info.path(),
                    "method" => info.method().to_string(),
                );
            }
            status => {
                debug!(
                    log,
                    "Error processing HTTP API request";
                    "elapsed" => format!("{:?}", info.elapsed()),
                    "status" => status.to_string(),
                    "path" => info.path(),
                    "method" => info.method().to_string(),
                );
            }
        };
    })
}

/// A `warp` logging filter which records request metrics.
pub fn prometheus_metrics() -> warp::filters::log::Log<impl Fn(warp::filters::log::Info) + Clone>
{
    warp::log::custom(move |info| {
        // Only the known routes are counted by path, to keep label cardinality bounded.
        let path = match info.path() {
            path @ ("/eth/v1/beacon/pool/attester_slashings"
            | "/eth/v1/beacon/pool/proposer_slashings"
            | "/eth/v1/beacon/pool/voluntary_exits"
            | "/metrics") => path,
            _ => "other",
        };

        metrics::inc_counter_vec(&metrics::HTTP_API_PATHS_TOTAL, &[path]);
        metrics::inc_counter_vec(
            &metrics::HTTP_API_STATUS_CODES_TOTAL,
            &[info.status().as_str()],
        );
        if let Some(histogram) = metrics::get_histogram(&metrics::HTTP_API_PATHS_TIMES, &[path]) {
            histogram.observe(info.elapsed().as_secs_f64());
        }
    })
}

/// Creates a server that will serve requests using information from `ctx`.
///
/// The server will shut down gracefully when the `shutdown` future resolves.
///
/// ## Returns
///
/// This function will bind the server to the provided address and then return a tuple of:
///
/// - `SocketAddr`: the address that the HTTP server will listen on.
/// - `Future`: the actual server future that will need to be awaited.
///
/// ## Errors
///
/// Returns an error if the server is unable to bind or there is another error during
/// configuration.
pub fn serve<T: GatewayTypes>(
    ctx: Arc<Context<T>>,
    shutdown: impl Future<Output = ()> + Send + Sync + 'static,
) -> Result<(SocketAddr, impl Future<Output = ()>), Error> {
    let config = ctx.config.clone();
    let log = ctx.log.clone();

    // Configure CORS.
    let cors_builder = {
        let builder = warp::cors()
            .allow_methods(vec!["GET", "POST"])
            .allow_headers(vec!["Content-Type"]);

        warp_utils::cors::set_builder_origins(
            builder,
            config.allow_origin.as_deref(),
            (config.listen_addr, config.listen_port),
        )?
    };

    // Sanity check.
    if !config.enabled {
        crit!(log, "Cannot start disabled HTTP server");
        return Err(Error::Other(
            "A disabled server should not be started".to_string(),
        ));
    }

    // Create a `warp` filter that provides access to the gateway.
    let inner_ctx = ctx.clone();
    let gateway_filter =
        warp::any()
            .map(move || inner_ctx.gateway.clone())
            .and_then(|gateway| async move {
                match gateway {
                    Some(gateway) => Ok(gateway),
                    None => Err(custom_server_error(
                        "admission gateway is not available".to_string(),
                    )),
                }
            });

    let eth_v1 = warp::path("eth").and(warp::path("v1"));

    // Create a `warp` filter that provides access to the beacon pool endpoints.
    let beacon_pool_path = eth_v1
        .and(warp::path("beacon"))
        .and(warp::path("pool"))
        .and(gateway_filter.clone());

    // GET beacon/pool/attester_slashings
    let get_beacon_pool_attester_slashings = beacon_pool_path
        .clone()
        .and(warp::path("attester_slashings"))
        .and(warp::path::end())
        .and_then(|gateway: Arc<AdmissionGateway<T>>| async move {
            blocking_json_task(move || {
                gateway
                    .list_attester_slashings()
                    .map(GenericResponse::from)
                    .map_err(reject)
            })
            .await
        });

    // POST beacon/pool/attester_slashings
    let post_beacon_pool_attester_slashings = beacon_pool_path
        .clone()
        .and(warp::path("attester_slashings"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and_then(
            |gateway: Arc<AdmissionGateway<T>>, slashing: api_types::AttesterSlashing| async move {
                blocking_response_task(move || {
                    gateway.submit_attester_slashing(slashing).map_err(reject)?;
                    Ok(warp::reply())
                })
                .await
            },
        );

    // GET beacon/pool/proposer_slashings
    let get_beacon_pool_proposer_slashings = beacon_pool_path
        .clone()
        .and(warp::path("proposer_slashings"))
        .and(warp::path::end())
        .and_then(|gateway: Arc<AdmissionGateway<T>>| async move {
            blocking_json_task(move || {
                gateway
                    .list_proposer_slashings()
                    .map(GenericResponse::from)
                    .map_err(reject)
            })
            .await
        });

    // POST beacon/pool/proposer_slashings
    let post_beacon_pool_proposer_slashings = beacon_pool_path
        .clone()
        .and(warp::path("proposer_slashings"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and_then(
            |gateway: Arc<AdmissionGateway<T>>, slashing: api_types::ProposerSlashing| async move {
                blocking_response_task(move || {
                    gateway.submit_proposer_slashing(slashing).map_err(reject)?;
                    Ok(warp::reply())
                })
                .await
            },
        );

    // GET beacon/pool/voluntary_exits
    let get_beacon_pool_voluntary_exits = beacon_pool_path
        .clone()
        .and(warp::path("voluntary_exits"))
        .and(warp::path::end())
        .and_then(|gateway: Arc<AdmissionGateway<T>>| async move {
            blocking_json_task(move || {
                gateway
                    .list_voluntary_exits()
                    .map(GenericResponse::from)
                    .map_err(reject)
            })
            .await
        });

    // POST beacon/pool/voluntary_exits
    let post_beacon_pool_voluntary_exits = beacon_pool_path
        .clone()
        .and(warp::path("voluntary_exits"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and_then(
            |gateway: Arc<AdmissionGateway<T>>, exit: api_types::SignedVoluntaryExit| async move {
                blocking_response_task(move || {
                    gateway.submit_voluntary_exit(exit).map_err(reject)?;
                    Ok(warp::reply())
                })
                .await
            },
        );

    // GET metrics
    let get_metrics = warp::path("metrics")
        .and(warp::path::end())
        .and_then(|| async move {
            blocking_response_task(|| {
                metrics::encode_text()
                    .map(|text| {
                        warp::reply::with_header(text, "Content-Type", "text/plain; version=0.0.4")
                    })
                    .map_err(custom_server_error)
            })
            .await
        });

    let routes = warp::get()
        .and(
            get_beacon_pool_attester_slashings
                .or(get_beacon_pool_proposer_slashings)
                .or(get_beacon_pool_voluntary_exits)
                .or(get_metrics),
        )
        .or(warp::post().and(
            post_beacon_pool_attester_slashings
                .or(post_beacon_pool_proposer_slashings)
                .or(post_beacon_pool_voluntary_exits),
        ))
        .recover(warp_utils::reject::handle_rejection)
        .with(slog_logging(log.clone()))
        .with(prometheus_metrics())
        .with(cors_builder.build());

    let (listening_socket, server) = warp::serve(routes).try_bind_with_graceful_shutdown(
        SocketAddr::new(config.listen_addr, config.listen_port),
        async {
            shutdown.await;
        },
    )?;

    info!(
        log,
        "HTTP API started";
        "listen_address" => %listening_socket,
    );

    Ok((listening_socket, server))
}
