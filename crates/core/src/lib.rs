pub mod config;
pub mod error;
pub mod profile;
pub mod record;

pub use config::{AnomalyConfig, BlendStrategy, Config, EngineConfig};
pub use error::*;
pub use profile::{CustomThresholds, RiskAppetiteProfile, Sensitivity};
pub use record::*;
