//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Console settings
    #[serde(default)]
    pub console: RawConsoleConfig,

    /// Sessions in curriculum order
    #[serde(default)]
    pub sessions: Vec<RawSession>,

    /// Lab definitions
    #[serde(default)]
    pub labs: Vec<RawLab>,

    /// Access codes accepted by the login gate
    #[serde(default)]
    pub learners: Vec<RawLearner>,
}

/// Console-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConsoleConfig {
    /// Data directory for the progress database
    pub data_dir: Option<PathBuf>,

    /// Seconds between time-accrual ticks (default: 60)
    pub tick_interval_seconds: Option<u64>,

    /// Minutes credited per tick (default: 1)
    pub minutes_per_tick: Option<u64>,

    /// Maximum lines kept in a lab's output log (default: 1000)
    pub output_cap: Option<usize>,
}

/// Raw session definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSession {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub week: u32,
    pub number: u32,
    #[serde(default)]
    pub duration: Option<String>,
    pub difficulty: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub labs: Vec<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Raw lab definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawLab {
    pub session: String,
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub steps: Vec<RawStep>,
}

/// Raw lab step
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawStep {
    pub title: String,
    pub instruction: String,
    pub expected: Option<String>,
    pub hint: Option<String>,
}

/// Raw learner grant
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawLearner {
    pub access_code: String,
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub access_level: Option<String>,

    /// Last day the code is accepted (YYYY-MM-DD)
    #[serde(default)]
    pub expires_on: Option<String>,
}
