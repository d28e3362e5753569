use serde::Deserialize;

/// How the signed-in user is identified on incoming requests
///
/// The session provider sits in front of this service and forwards the
/// authenticated user id in a trusted header.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Header carrying the user id
    #[serde(default = "default_header")]
    pub header: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
        }
    }
}

fn default_header() -> String {
    "x-pivothire-user".to_owned()
}
