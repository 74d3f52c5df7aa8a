use crate::domain::model::{AuthSession, Record};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DiagError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// REST/RPC client for the hosted database service.
///
/// 瀏覽器端各腳本共用一個掛在 window 上的 client；這裡改成顯式建構、
/// 顯式傳遞給每個檢查。
pub struct BackendClient {
    base_url: String,
    anon_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default = "bearer")]
    token_type: String,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    user: Option<TokenUser>,
}

fn bearer() -> String {
    "bearer".to_string()
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl BackendClient {
    pub fn from_config(config: &impl ConfigProvider) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self {
            base_url: config.base_url().trim_end_matches('/').to_string(),
            anon_key: config.anon_key().to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 最小 REST 探測，回傳狀態碼與延遲
    pub async fn health(&self) -> Result<(u16, Duration)> {
        let url = format!("{}/rest/v1/", self.base_url);
        tracing::debug!("📡 Probing backend: {}", url);

        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .send()
            .await?;
        let latency = started.elapsed();

        Ok((response.status().as_u16(), latency))
    }

    /// 直接查詢資料表：GET /rest/v1/{table}?{query}
    pub async fn select(&self, table: &str, query: &str, token: Option<&str>) -> Result<Vec<Record>> {
        let url = format!("{}/rest/v1/{}?{}", self.base_url, table, query);
        tracing::debug!("📡 Table query: {}", url);

        let bearer = token.unwrap_or(&self.anon_key);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
            .send()
            .await?;

        Self::records_from_response(response).await
    }

    /// 遠端程序呼叫：POST /rest/v1/rpc/{function}
    pub async fn rpc(
        &self,
        function: &str,
        payload: serde_json::Value,
        token: Option<&str>,
    ) -> Result<Vec<Record>> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        tracing::debug!("📡 RPC call: {}", url);

        let bearer = token.unwrap_or(&self.anon_key);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
            .json(&payload)
            .send()
            .await?;

        Self::records_from_response(response).await
    }

    /// 密碼登入：POST /auth/v1/token?grant_type=password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        tracing::debug!("🔑 Signing in as {}", email);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        Self::session_from_response("password_grant", response).await
    }

    /// 以 refresh token 換新 access token
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        Self::session_from_response("token_refresh", response).await
    }

    /// 取得目前使用者資料：GET /auth/v1/user
    pub async fn user_profile(&self, token: &str) -> Result<Record> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DiagError::AuthError {
                stage: "user_profile".to_string(),
                details: format!("{}: {}", status, body),
            });
        }

        let value: serde_json::Value = response.json().await?;
        Ok(Record::from_value(value))
    }

    async fn records_from_response(response: reqwest::Response) -> Result<Vec<Record>> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DiagError::BackendError { status, body });
        }

        let json_data: serde_json::Value = response.json().await?;

        // 陣列逐列展開，單一物件包成一筆
        let records = match json_data {
            serde_json::Value::Array(items) => items.into_iter().map(Record::from_value).collect(),
            other => vec![Record::from_value(other)],
        };

        Ok(records)
    }

    async fn session_from_response(stage: &str, response: reqwest::Response) -> Result<AuthSession> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DiagError::AuthError {
                stage: stage.to_string(),
                details: format!("{}: {}", status, body),
            });
        }

        let token: TokenResponse = response.json().await?;
        let issued_at = chrono::Utc::now().timestamp();

        Ok(AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            token_type: token.token_type,
            expires_at: issued_at + token.expires_in,
            user_id: token.user.as_ref().map(|u| u.id.clone()).unwrap_or_default(),
            email: token.user.and_then(|u| u.email),
        })
    }
}
