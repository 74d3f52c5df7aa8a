pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use core::{BackendClient, Check, CheckContext, CheckSuite};
pub use domain::birthday::{days_until_birthday, next_birthday, try_days_until_birthday};
pub use domain::model::{AuthSession, CheckReport, CheckStatus, Contact, Record};
pub use utils::error::{DiagError, Result};
