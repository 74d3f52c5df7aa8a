use crate::core::api::BackendClient;
use crate::core::runner::{Check, CheckContext};
use crate::domain::model::{CheckReport, CheckStatus};
use crate::utils::error::Result;
use std::sync::Arc;

/// 認證流程檢查：密碼登入 → 帶 token 取使用者資料 → 換發 token。
/// 成功後把 token 與 user_id 發佈到上下文給後續檢查使用。
pub struct AuthCheck {
    client: Arc<BackendClient>,
    email: Option<String>,
    password: Option<String>,
}

impl AuthCheck {
    pub const NAME: &'static str = "auth";

    pub fn new(client: Arc<BackendClient>, email: Option<String>, password: Option<String>) -> Self {
        Self {
            client,
            email,
            password,
        }
    }
}

#[async_trait::async_trait]
impl Check for AuthCheck {
    fn name(&self) -> &str {
        Self::NAME
    }

    /// 沒有設定測試帳號就跳過，不算失敗
    fn should_run(&self, _context: &CheckContext) -> bool {
        self.email.is_some() && self.password.is_some()
    }

    async fn run(&self, _context: &CheckContext) -> Result<CheckReport> {
        // should_run 已保證帳密存在
        let (Some(email), Some(password)) = (self.email.as_deref(), self.password.as_deref())
        else {
            return Ok(CheckReport::new(Self::NAME).with_status(CheckStatus::Skipped));
        };

        let session = self.client.sign_in(email, password).await?;
        tracing::info!("🔑 Signed in as {} (user {})", email, session.user_id);

        let mut report = CheckReport::new(Self::NAME)
            .detail(format!("Signed in as {}", email))
            .meta(
                "shared.access_token",
                serde_json::Value::String(session.access_token.clone()),
            )
            .meta(
                "shared.user_id",
                serde_json::Value::String(session.user_id.clone()),
            )
            .meta("shared.session", serde_json::to_value(&session)?);

        // 用剛拿到的 token 取使用者資料，驗證 token 真的可用
        let profile = self.client.user_profile(&session.access_token).await?;
        report = report.detail(format!(
            "Profile fetch confirmed token (user {})",
            profile.get_str("id").unwrap_or("<unknown>")
        ));
        report.records.push(profile);

        // 換發是非致命的：失敗降級為警告
        match self.client.refresh(&session.refresh_token).await {
            Ok(renewed) => {
                let rotated = renewed.access_token != session.access_token;
                report = report.detail(if rotated {
                    "Token refresh succeeded (token rotated)".to_string()
                } else {
                    "Token refresh succeeded (token unchanged)".to_string()
                });
            }
            Err(e) => {
                report = report
                    .with_status(CheckStatus::Warning)
                    .detail(format!("Token refresh failed: {}", e));
            }
        }

        Ok(report)
    }
}
