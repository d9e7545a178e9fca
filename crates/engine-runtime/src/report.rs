use chrono::{DateTime, Utc};
use engine_core::metrics::MetricsSnapshot;
use model::{resource::ResourceKind, watermark::Watermark};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Step of the per-resource pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Fetch,
    Normalize,
    Write,
    Upload,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Fetch => "fetch",
            PipelineStage::Normalize => "normalize",
            PipelineStage::Write => "write",
            PipelineStage::Upload => "upload",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResourceOutcome {
    Delivered { files: usize, rows: usize, bytes: u64 },
    Failed { stage: PipelineStage, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceReport {
    pub resource: ResourceKind,
    pub outcome: ResourceOutcome,
    pub pages: u32,
    pub records: usize,
    pub elapsed_ms: u128,
}

impl ResourceReport {
    pub fn is_delivered(&self) -> bool {
        matches!(self.outcome, ResourceOutcome::Delivered { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub watermark: Option<Watermark>,
    pub resources: Vec<ResourceReport>,
    pub metrics: MetricsSnapshot,
}

impl RunReport {
    /// True only when every resource was delivered.
    pub fn succeeded(&self) -> bool {
        self.resources.iter().all(ResourceReport::is_delivered)
    }

    pub fn failed(&self) -> impl Iterator<Item = &ResourceReport> {
        self.resources.iter().filter(|r| !r.is_delivered())
    }

    pub fn resource(&self, resource: ResourceKind) -> Option<&ResourceReport> {
        self.resources.iter().find(|r| r.resource == resource)
    }
}
