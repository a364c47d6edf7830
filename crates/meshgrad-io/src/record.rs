use meshgrad_core::{MeshStore, ShareError};
use serde::{Deserialize, Serialize};

use crate::export::ExportFormat;

/// Gallery entry for a saved gradient, keyed by its share string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientRecord {
    pub share: String,
    pub width: u32,
    pub height: u32,
    pub shapes_count: usize,
    pub colors_count: usize,
    pub exported_formats: Vec<ExportFormat>,
}

impl GradientRecord {
    pub fn from_store(store: &MeshStore) -> Result<Self, ShareError> {
        let summary = store.share_summary()?;
        let canvas = &store.state().canvas;
        Ok(Self {
            share: summary.share,
            width: canvas.width,
            height: canvas.height,
            shapes_count: summary.shapes_count,
            colors_count: summary.colors_count,
            exported_formats: Vec::new(),
        })
    }

    /// Note an export. Formats stay unique, in first-export order.
    pub fn record_export(&mut self, format: ExportFormat) {
        if !self.exported_formats.contains(&format) {
            self.exported_formats.push(format);
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
