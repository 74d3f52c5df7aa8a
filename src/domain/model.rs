use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// 後端回傳的通用資料列
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn from_value(value: serde_json::Value) -> Self {
        let mut data = HashMap::new();
        match value {
            serde_json::Value::Object(obj) => {
                for (key, val) in obj {
                    data.insert(key, val);
                }
            }
            other => {
                data.insert("response".to_string(), other);
            }
        }
        Record { data }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(|v| v.as_i64())
    }
}

/// contacts 資料表的一列。birth_date 保留原始字串，
/// 格式錯誤的值要留給倒數計算做降級處理，不在反序列化時拒絕。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: serde_json::Value,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
}

impl Contact {
    pub fn from_record(record: &Record) -> Option<Contact> {
        let value = serde_json::Value::Object(
            record
                .data
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        serde_json::from_value(value).ok()
    }
}

/// 認證會話，與網頁端存在 local storage 的 JSON 佈局一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Unix seconds at which the access token stops working
    pub expires_at: i64,
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthSession {
    pub fn is_expired(&self, now_unix: i64) -> bool {
        self.expires_at <= now_unix
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Warning,
    Failed,
    Skipped,
}

impl CheckStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "✅",
            CheckStatus::Warning => "⚠️",
            CheckStatus::Failed => "❌",
            CheckStatus::Skipped => "⏭️",
        }
    }
}

/// 單一檢查的執行結果
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub check_name: String,
    pub status: CheckStatus,
    pub records: Vec<Record>,
    pub details: Vec<String>,
    pub duration: Duration,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl CheckReport {
    pub fn new(check_name: &str) -> Self {
        Self {
            check_name: check_name.to_string(),
            status: CheckStatus::Passed,
            records: Vec::new(),
            details: Vec::new(),
            duration: Duration::ZERO,
            metadata: HashMap::new(),
        }
    }

    pub fn with_status(mut self, status: CheckStatus) -> Self {
        self.status = status;
        self
    }

    pub fn detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }

    pub fn meta(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}
