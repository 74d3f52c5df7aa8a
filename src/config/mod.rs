pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{
    self, validate_non_empty_string, validate_path, validate_range, validate_url,
};

/// 合法的檢查名稱，順序即預設執行順序
pub const ALL_CHECKS: [&str; 5] = ["connectivity", "auth", "contacts", "session", "birthdays"];

pub fn validate_check_names(field_name: &str, names: &[String]) -> Result<()> {
    for name in names {
        if !ALL_CHECKS.contains(&name.as_str()) {
            return Err(crate::utils::error::DiagError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.clone(),
                reason: format!("Unknown check. Valid checks: {}", ALL_CHECKS.join(", ")),
            });
        }
    }
    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "contact-doctor")]
#[command(about = "Diagnostics for the contact-book backend")]
pub struct CliConfig {
    /// Backend project URL, e.g. https://xyz.supabase.co
    #[arg(long, default_value = "http://localhost:54321")]
    pub base_url: String,

    /// Public (anon) API key
    #[arg(long, default_value = "")]
    pub anon_key: String,

    #[arg(long, default_value = "contacts")]
    pub contacts_table: String,

    #[arg(long, default_value = "get_user_contacts")]
    pub rpc_function: String,

    #[arg(long, default_value = "10")]
    pub timeout_seconds: u64,

    /// Test account for the auth check (skipped when absent)
    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Directory holding the persisted session file
    #[arg(long, default_value = "./session")]
    pub session_path: String,

    #[arg(long, default_value = "session.json")]
    pub session_file: String,

    /// Checks to run, in order
    #[arg(long, value_delimiter = ',', default_values_t = ALL_CHECKS.map(String::from))]
    pub checks: Vec<String>,

    /// Abort the suite on the first failed check
    #[arg(long)]
    pub halt_on_failure: bool,

    /// Window for the "upcoming birthdays" count
    #[arg(long, default_value = "30")]
    pub upcoming_window_days: i64,

    /// Load settings from a TOML file instead of flags
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process cpu/memory stats")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn anon_key(&self) -> &str {
        &self.anon_key
    }

    fn contacts_table(&self) -> &str {
        &self.contacts_table
    }

    fn rpc_function(&self) -> &str {
        &self.rpc_function
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

#[cfg(feature = "cli")]
impl validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_non_empty_string("anon_key", &self.anon_key)?;
        validate_non_empty_string("contacts_table", &self.contacts_table)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        validate_range("upcoming_window_days", self.upcoming_window_days, 0, 366)?;
        validate_path("session_path", &self.session_path)?;
        validate_check_names("checks", &self.checks)?;
        Ok(())
    }
}
