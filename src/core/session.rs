use crate::core::runner::{Check, CheckContext};
use crate::domain::model::{AuthSession, CheckReport, CheckStatus};
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// 會話持久化檢查，對應網頁端的 local storage 讀寫測試。
///
/// 有登入檢查發佈的新會話就寫入再讀回比對；沒有的話退回
/// 驗證既有的會話檔（存在與否、是否過期）。
pub struct SessionCheck<S: Storage> {
    storage: S,
    file_name: String,
}

impl<S: Storage> SessionCheck<S> {
    pub const NAME: &'static str = "session";

    pub fn new(storage: S, file_name: String) -> Self {
        Self { storage, file_name }
    }

    async fn round_trip(&self, session: &AuthSession) -> Result<CheckReport> {
        let payload = serde_json::to_vec(session)?;
        self.storage.write_file(&self.file_name, &payload).await?;

        let raw = self.storage.read_file(&self.file_name).await?;
        let restored: AuthSession = serde_json::from_slice(&raw)?;

        let mut report = CheckReport::new(Self::NAME);
        if restored == *session {
            report = report.detail(format!(
                "Session for user {} persisted and read back intact",
                session.user_id
            ));
        } else {
            report = report
                .with_status(CheckStatus::Failed)
                .detail("Restored session does not match what was written".to_string());
        }
        Ok(report)
    }

    async fn inspect_stored(&self) -> Result<CheckReport> {
        let raw = match self.storage.read_file(&self.file_name).await {
            Ok(raw) => raw,
            Err(_) => {
                return Ok(CheckReport::new(Self::NAME)
                    .with_status(CheckStatus::Warning)
                    .detail(format!(
                        "No stored session at {} and no fresh session to persist",
                        self.file_name
                    )));
            }
        };

        let session: AuthSession = match serde_json::from_slice(&raw) {
            Ok(session) => session,
            Err(e) => {
                return Ok(CheckReport::new(Self::NAME)
                    .with_status(CheckStatus::Failed)
                    .detail(format!("Stored session is not valid JSON: {}", e)));
            }
        };

        let now = chrono::Utc::now().timestamp();
        let report = if session.is_expired(now) {
            CheckReport::new(Self::NAME)
                .with_status(CheckStatus::Warning)
                .detail(format!(
                    "Stored session for user {} expired {}s ago",
                    session.user_id,
                    now - session.expires_at
                ))
        } else {
            CheckReport::new(Self::NAME).detail(format!(
                "Stored session for user {} valid for another {}s",
                session.user_id,
                session.expires_at - now
            ))
        };
        Ok(report.meta(
            "expires_at",
            serde_json::Value::Number(session.expires_at.into()),
        ))
    }
}

#[async_trait::async_trait]
impl<S: Storage> Check for SessionCheck<S> {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn run(&self, context: &CheckContext) -> Result<CheckReport> {
        let fresh_session = context
            .get_shared_data("session")
            .cloned()
            .and_then(|v| serde_json::from_value::<AuthSession>(v).ok());

        match fresh_session {
            Some(session) => self.round_trip(&session).await,
            None => self.inspect_stored().await,
        }
    }
}
