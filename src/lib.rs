//! Play Store review harvester for Malaysian telco apps.
//!
//! Pages through each app's newest reviews, enriches them with language,
//! region and category tags, and exports one CSV per app.

pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;
