//! Snapshot serialization — a rendered dashboard view to/from JSON.
//!
//! A snapshot is what the presentation layer consumes. It carries the
//! view plus enough provenance to tell two snapshots apart.

use crate::{dashboard::DashboardView, error::InsightsResult};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub format_version: u32,
    pub producer:       String,
    /// Caller-supplied timestamp (RFC 3339). The core never reads a clock.
    pub generated_at:   String,
    pub view:           DashboardView,
}

impl DashboardSnapshot {
    pub fn new(producer: impl Into<String>, generated_at: impl Into<String>, view: DashboardView) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            producer:       producer.into(),
            generated_at:   generated_at.into(),
            view,
        }
    }

    pub fn to_json(&self) -> InsightsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> InsightsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> InsightsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
