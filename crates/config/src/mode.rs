use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Whether the current invocation is a production build.
///
/// Preloading only happens in production; during development every locator
/// is passed through untouched.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[display("production")]
    #[serde(alias = "prod")]
    Production,
    #[default]
    #[display("development")]
    #[serde(alias = "dev")]
    Development,
}
impl Mode {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}
