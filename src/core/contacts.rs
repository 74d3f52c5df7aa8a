use crate::core::api::BackendClient;
use crate::core::runner::{Check, CheckContext};
use crate::domain::model::{CheckReport, CheckStatus};
use crate::utils::error::Result;
use std::collections::BTreeSet;
use std::sync::Arc;

/// 聯絡人讀取檢查：同一份資料各用資料表直查和 RPC 取一次，
/// 比對筆數與 id 集合是否一致。
pub struct ContactsCheck {
    client: Arc<BackendClient>,
    table: String,
    rpc_function: String,
}

impl ContactsCheck {
    pub const NAME: &'static str = "contacts";

    pub fn new(client: Arc<BackendClient>, table: String, rpc_function: String) -> Self {
        Self {
            client,
            table,
            rpc_function,
        }
    }

    fn id_set(records: &[crate::domain::model::Record]) -> BTreeSet<String> {
        records
            .iter()
            .filter_map(|r| r.data.get("id"))
            .map(|v| v.to_string())
            .collect()
    }
}

#[async_trait::async_trait]
impl Check for ContactsCheck {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, context: &CheckContext) -> Result<CheckReport> {
        let token = context.access_token();
        if token.is_none() {
            tracing::debug!("📇 No access token in context, querying with anon key");
        }

        let direct = self.client.select(&self.table, "select=*", token).await?;
        tracing::info!("📇 Direct table query returned {} rows", direct.len());

        let payload = match context.get_shared_data("user_id") {
            Some(user_id) => serde_json::json!({ "p_user_id": user_id }),
            None => serde_json::json!({}),
        };

        let mut report = CheckReport::new(Self::NAME).meta(
            "direct_count",
            serde_json::Value::Number(direct.len().into()),
        );

        match self.client.rpc(&self.rpc_function, payload, token).await {
            Ok(via_rpc) => {
                tracing::info!("📇 RPC {} returned {} rows", self.rpc_function, via_rpc.len());
                report = report.meta(
                    "rpc_count",
                    serde_json::Value::Number(via_rpc.len().into()),
                );

                let direct_ids = Self::id_set(&direct);
                let rpc_ids = Self::id_set(&via_rpc);
                let parity = direct.len() == via_rpc.len() && direct_ids == rpc_ids;
                report = report.meta("parity", serde_json::Value::Bool(parity));

                if parity {
                    report = report.detail(format!(
                        "Table query and RPC agree ({} contacts)",
                        direct.len()
                    ));
                } else {
                    report = report.with_status(CheckStatus::Warning).detail(format!(
                        "Row mismatch: table query {} rows, RPC {} rows",
                        direct.len(),
                        via_rpc.len()
                    ));
                    let only_direct: Vec<_> =
                        direct_ids.difference(&rpc_ids).cloned().collect();
                    if !only_direct.is_empty() {
                        report = report
                            .detail(format!("Ids missing from RPC: {}", only_direct.join(", ")));
                    }
                    let only_rpc: Vec<_> = rpc_ids.difference(&direct_ids).cloned().collect();
                    if !only_rpc.is_empty() {
                        report = report
                            .detail(format!("Ids only in RPC: {}", only_rpc.join(", ")));
                    }
                }
            }
            Err(e) => {
                // 直查成功而 RPC 失敗：回報警告，資料列仍然可用
                report = report
                    .with_status(CheckStatus::Warning)
                    .detail(format!("RPC {} failed: {}", self.rpc_function, e));
            }
        }

        report.records = direct;
        Ok(report)
    }
}
