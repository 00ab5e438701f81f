use std::net::IpAddr;
use std::str::FromStr;
use warp::{cors::Builder, http::Uri};

/// Configure a `cors::Builder`.
///
/// If `allow_origin.is_none()` the `default_origin` is used.
pub fn set_builder_origins(
    builder: Builder,
    allow_origin: Option<&str>,
    default_origin: (IpAddr, u16),
) -> Result<Builder, String> {
    if let Some(allow_origin) = allow_origin {
        let origins = allow_origin
            .split(',')
            .map(|s| verify_cors_origin_str(s).map(|_| s))
            .collect::<Result<Vec<_>, _>>()?;
        if origins.contains(&"*") {
            Ok(builder.allow_any_origin())
        } else {
            Ok(builder.allow_origins(origins))
        }
    } else {
        let origin = match default_origin.0 {
            IpAddr::V4(_) => format!("http://{}:{}", default_origin.0, default_origin.1),
            IpAddr::V6(_) => format!("http://[{}]:{}", default_origin.0, default_origin.1),
        };
        verify_cors_origin_str(&origin)?;
        Ok(builder.allow_origin(origin.as_str()))
    }
}

/// Verify that `s` can be used as a CORS origin.
///
/// ## Notes
///
/// We need this function since `warp` will panic if provided an invalid origin. The verification
/// code is taken from here:
///
/// https://github.com/seanmonstar/warp/blob/3d1760c6ca35ad2d72dd3b95c9bbd17ae5a4c1b5/src/filters/cors.rs#L616-L630
///
/// Ideally we should make a PR to `warp` to expose this behaviour, however we defer this for a
/// later time. The risk of a false positive or false negative is low since there are only 2 cases
/// (`*` or a valid origin URI) and the code is short.
pub fn verify_cors_origin_str(s: &str) -> Result<(), String> {
    if s == "*" {
        return Ok(());
    }

    match Uri::from_str(s) {
        Ok(uri) => {
            if uri.scheme().is_none() {
                return Err(format!("Origin {} must have a scheme", s));
            }
            if uri.host().is_none() {
                return Err(format!("Origin {} must have a host", s));
            }
            if uri.path_and_query().map_or(false, |p| p.as_str() != "/") {
                return Err(format!("Origin {} must not have a path", s));
            }
            Ok(())
        }
        Err(e) => Err(format!("Unable to parse origin {}: {}", s, e)),
    }
}
