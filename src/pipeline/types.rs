//! Pipeline types

use crate::error::{Error, Result};
use crate::gate::RejectedRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where the pipeline is in its fetch/map/gate/accumulate cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Init,
    Fetching,
    Mapping,
    Gating,
    Accumulating,
    FlushFinal,
    Done,
}

impl PipelineState {
    /// Whether moving to `next` is a legal transition
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Fetching)
                | (Self::Fetching, Self::Mapping)
                | (Self::Fetching, Self::FlushFinal)
                | (Self::Mapping, Self::Gating)
                | (Self::Gating, Self::Accumulating)
                | (Self::Accumulating, Self::Fetching)
                | (Self::FlushFinal, Self::Done)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Fetching => "fetching",
            Self::Mapping => "mapping",
            Self::Gating => "gating",
            Self::Accumulating => "accumulating",
            Self::FlushFinal => "flush_final",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizes fixed for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    page_size: usize,
    max_size: usize,
}

impl PipelineConfig {
    /// Both sizes must be greater than zero
    pub fn new(page_size: usize, max_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }
        if max_size == 0 {
            return Err(Error::invalid_value("max_size", "must be greater than 0"));
        }
        Ok(Self {
            page_size,
            max_size,
        })
    }

    /// Rows requested per fetch
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Records per persisted artifact
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

/// Summary of one extraction run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Run name
    pub name: String,
    /// Non-empty pages fetched
    pub pages: usize,
    /// Records produced by the mapper
    pub gathered: usize,
    /// Records that passed the gate
    pub accepted: usize,
    /// Records the filter turned away
    pub filtered: usize,
    /// Records dropped because parsing failed, positioned by their index
    /// among all records gathered in the run
    pub parse_rejects: Vec<RejectedRecord>,
    /// Artifacts in flush order
    pub paths: Vec<PathBuf>,
    /// Last state reached
    pub state: PipelineState,
    /// Error that ended the run early
    pub error: Option<String>,
    /// Wall time of the run in seconds
    pub elapsed_secs: f64,
}

impl ExtractionReport {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Whether the run reached `Done` without an error
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.state == PipelineState::Done
    }
}
