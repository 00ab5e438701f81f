use crate::reject::custom_server_error;
use serde::Serialize;
use warp::reply::{Reply, Response};

/// Execute some task in a tokio "blocking thread". These threads are ideal for long-running
/// (blocking) tasks since they don't jam up the core executor.
pub async fn blocking_task<F, T>(func: F) -> Result<T, warp::Rejection>
where
    F: FnOnce() -> Result<T, warp::Rejection> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(func)
        .await
        .unwrap_or_else(|e| Err(custom_server_error(format!("task failed: {}", e))))
}

/// A convenience wrapper around `blocking_task` that returns a `warp::reply::Response`.
pub async fn blocking_response_task<F, T>(func: F) -> Result<Response, warp::Rejection>
where
    F: FnOnce() -> Result<T, warp::Rejection> + Send + 'static,
    T: Reply + Send + 'static,
{
    blocking_task(func).await.map(Reply::into_response)
}

/// A convenience wrapper around `blocking_task` for use with `warp` JSON responses.
pub async fn blocking_json_task<F, T>(func: F) -> Result<warp::reply::Json, warp::Rejection>
where
    F: FnOnce() -> Result<T, warp::Rejection> + Send + 'static,
    T: Serialize + Send + 'static,
{
    blocking_task(func)
        .await
        .map(|resp| warp::reply::json(&resp))
}
