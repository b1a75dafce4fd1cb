use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::media::{MediaFilter, MediaKind};
use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

/// Which files count as media.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Kind whose default extension set is used.
    #[serde(default)]
    pub kind: MediaKind,
    /// Replaces the default extension set when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
    /// Added on top of the selected extension set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_extensions: Vec<String>,
}

impl MediaConfig {
    /// Builds the media predicate this section describes.
    pub fn filter(&self) -> MediaFilter {
        let base = if self.extensions.is_empty() {
            MediaFilter::for_kind(self.kind)
        } else {
            MediaFilter::from_extensions(&self.extensions)
        };
        base.with_extra(&self.extra_extensions)
    }
}
