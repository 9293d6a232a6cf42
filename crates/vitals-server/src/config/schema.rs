use std::net::SocketAddr;

use serde::Deserialize;
use vitals_core::error::{Result, VitalsError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    /// Which record handler serves `/test/{value}`.
    #[serde(default)]
    pub handler: HandlerKind,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(VitalsError::BadRequest("version must be 1".into()));
        }
        self.server.validate()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Free-form description served on `/about`.
    #[serde(default = "default_about")]
    pub about: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            about: default_about(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen.parse::<SocketAddr>().map_err(|e| {
            VitalsError::BadRequest(format!("server.listen is not a valid address: {e}"))
        })?;
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_about() -> String {
    "vitals test server".into()
}

/// Built-in record handlers selectable from config. Embedders that need
/// something else inject it through `AppState::with_handler`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    #[default]
    Magic,
}
