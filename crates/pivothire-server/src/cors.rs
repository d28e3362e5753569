use http::header::HeaderName;
use http::{HeaderValue, Method};
use pivothire_config::{AllowList, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build the CORS layer for browser clients
///
/// Entries that do not parse as an origin, method, or header name are
/// skipped with a warning.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new()
        .allow_origin(match &config.origins {
            AllowList::Any => AllowOrigin::any(),
            AllowList::Only(origins) => AllowOrigin::list(parse_all::<HeaderValue>("origin", origins)),
        })
        .allow_methods(match &config.methods {
            AllowList::Any => AllowMethods::any(),
            AllowList::Only(methods) => AllowMethods::list(parse_all::<Method>("method", methods)),
        })
        .allow_headers(match &config.headers {
            AllowList::Any => AllowHeaders::any(),
            AllowList::Only(headers) => AllowHeaders::list(parse_all::<HeaderName>("header", headers)),
        });

    if config.credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(duration) = config.max_age_duration() {
        layer = layer.max_age(duration);
    }

    layer
}

fn parse_all<T: std::str::FromStr>(kind: &str, values: &[String]) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                tracing::warn!(%kind, %value, "ignoring invalid CORS entry");
            }
            parsed
        })
        .collect()
}
