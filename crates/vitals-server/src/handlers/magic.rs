use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use vitals_core::error::{Result, VitalsError};
use vitals_core::metrics::Registry;

use super::{ApiMessage, CallerContext, RecordHandler};

/// Default handler: counts the request in the "requests" meter and records
/// the truncated value into the "values" histogram.
pub struct MagicHandler {
    registry: Arc<Registry>,
}

impl MagicHandler {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl RecordHandler for MagicHandler {
    fn name(&self) -> &'static str {
        "magic"
    }

    async fn record(&self, value: Decimal, _ctx: &CallerContext) -> Result<ApiMessage> {
        // Truncation toward zero, not rounding. Resolve the sample before
        // touching any instrument so a rejected value moves no metric.
        let sample = value
            .trunc()
            .to_i64()
            .ok_or_else(|| VitalsError::BadRequest(format!("value out of range: {value}")))?;

        self.registry.meter("requests").mark();
        self.registry.histogram("values").update(sample as f64);

        // do some magic!
        Ok(ApiMessage::ok("magic!"))
    }
}
