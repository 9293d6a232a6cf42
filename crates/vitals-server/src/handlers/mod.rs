//! Record handlers: the pluggable implementation behind `/test/{value}`.
//!
//! The handler in use is chosen once at startup (config enum or explicit
//! injection), never looked up dynamically.

mod magic;

pub use magic::MagicHandler;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vitals_core::error::Result;

/// Opaque caller identity forwarded to handlers. The server never interprets
/// it; handlers may.
#[derive(Debug, Clone, Default)]
pub struct CallerContext {
    /// Raw `Authorization` header, if the caller sent one.
    pub authorization: Option<String>,
}

/// Fixed acknowledgement body returned by handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub code: u16,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            code: 200,
            kind: "ok".into(),
            message: message.into(),
        }
    }
}

/// A record handler receives the parsed decimal from the request path and
/// records whatever it needs before acknowledging.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn record(&self, value: Decimal, ctx: &CallerContext) -> Result<ApiMessage>;
}
