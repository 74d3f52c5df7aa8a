pub mod api;
pub mod auth;
pub mod birthdays;
pub mod connectivity;
pub mod contacts;
pub mod runner;
pub mod session;

pub use crate::domain::model::{AuthSession, CheckReport, CheckStatus, Contact, Record};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;

pub use api::BackendClient;
pub use runner::{Check, CheckContext, CheckSuite};
