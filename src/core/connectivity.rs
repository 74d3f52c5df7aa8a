use crate::core::api::BackendClient;
use crate::core::runner::{Check, CheckContext};
use crate::domain::model::{CheckReport, CheckStatus};
use crate::utils::error::Result;
use std::sync::Arc;

/// 連線檢查：對 REST 根端點做一次最小探測
pub struct ConnectivityCheck {
    client: Arc<BackendClient>,
}

impl ConnectivityCheck {
    pub const NAME: &'static str = "connectivity";

    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Check for ConnectivityCheck {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, _context: &CheckContext) -> Result<CheckReport> {
        let (status, latency) = self.client.health().await?;

        let mut report = CheckReport::new(Self::NAME)
            .meta("status_code", serde_json::Value::Number(status.into()))
            .meta(
                "latency_ms",
                serde_json::Value::Number((latency.as_millis() as u64).into()),
            );

        if (200..300).contains(&status) {
            report = report.detail(format!(
                "Backend reachable at {} ({} in {:?})",
                self.client.base_url(),
                status,
                latency
            ));
        } else {
            report = report
                .with_status(CheckStatus::Failed)
                .detail(format!("REST probe returned status {}", status));
        }

        Ok(report)
    }
}
