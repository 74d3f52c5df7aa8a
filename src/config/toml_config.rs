use crate::config::validate_check_names;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DiagError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub backend: BackendConfig,
    pub auth: Option<AuthConfig>,
    pub session: Option<SessionConfig>,
    pub checks: Option<ChecksConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub anon_key: String,
    pub contacts_table: Option<String>,
    pub rpc_function: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub storage_path: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    pub run: Option<Vec<String>>,
    pub halt_on_failure: Option<bool>,
    pub upcoming_window_days: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DiagError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DiagError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ANON_KEY})，金鑰和密碼不進設定檔
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_url("backend.base_url", &self.backend.base_url)?;
        validate_non_empty_string("backend.anon_key", &self.backend.anon_key)?;
        validate_range("backend.timeout_seconds", self.timeout_seconds(), 1, 300)?;
        validate_range(
            "checks.upcoming_window_days",
            self.upcoming_window_days(),
            0,
            366,
        )?;

        if let Some(checks) = &self.checks {
            if let Some(run) = &checks.run {
                validate_check_names("checks.run", run)?;
            }
        }

        Ok(())
    }

    pub fn email(&self) -> Option<String> {
        self.auth.as_ref().and_then(|a| a.email.clone())
    }

    pub fn password(&self) -> Option<String> {
        self.auth.as_ref().and_then(|a| a.password.clone())
    }

    pub fn session_path(&self) -> &str {
        self.session
            .as_ref()
            .and_then(|s| s.storage_path.as_deref())
            .unwrap_or("./session")
    }

    pub fn session_file(&self) -> &str {
        self.session
            .as_ref()
            .and_then(|s| s.file_name.as_deref())
            .unwrap_or("session.json")
    }

    pub fn checks_to_run(&self) -> Vec<String> {
        self.checks
            .as_ref()
            .and_then(|c| c.run.clone())
            .unwrap_or_else(|| crate::config::ALL_CHECKS.map(String::from).to_vec())
    }

    pub fn halt_on_failure(&self) -> bool {
        self.checks
            .as_ref()
            .and_then(|c| c.halt_on_failure)
            .unwrap_or(false)
    }

    pub fn upcoming_window_days(&self) -> i64 {
        self.checks
            .as_ref()
            .and_then(|c| c.upcoming_window_days)
            .unwrap_or(30)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.backend.base_url
    }

    fn anon_key(&self) -> &str {
        &self.backend.anon_key
    }

    fn contacts_table(&self) -> &str {
        self.backend.contacts_table.as_deref().unwrap_or("contacts")
    }

    fn rpc_function(&self) -> &str {
        self.backend
            .rpc_function
            .as_deref()
            .unwrap_or("get_user_contacts")
    }

    fn timeout_seconds(&self) -> u64 {
        self.backend.timeout_seconds.unwrap_or(10)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
