//! Bulk import and export payloads

use crate::core::FitHubResult;
use crate::core::query::PaymentFilters;
use crate::entities::PaymentStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A file to upload to `POST /payments/import`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl ImportFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk, keeping its base name
    pub async fn from_path(path: impl AsRef<Path>) -> FitHubResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "payments.csv".to_string());
        Ok(Self { file_name, content })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

/// Body of `POST /payments/export`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(default)]
    pub date_range: DateRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
    #[serde(default)]
    pub include_fields: Vec<String>,
    /// Active list filters, forwarded so the export matches the table
    #[serde(default, skip_serializing_if = "PaymentFilters::is_empty")]
    pub filters: PaymentFilters,
}

impl Default for ExportRequest {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            date_range: DateRange::default(),
            status: None,
            include_fields: ["member", "amount", "status", "dueDate", "type"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            filters: PaymentFilters::default(),
        }
    }
}

impl ExportRequest {
    /// Export whatever the current filters select
    pub fn from_filters(filters: &PaymentFilters) -> Self {
        Self {
            status: filters.status,
            filters: filters.clone(),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_range = DateRange { from, to };
        self
    }

    /// Suggested download name, e.g. `payments-2024-01-15T10:30:00+00:00.csv`
    pub fn file_name_at(&self, at: DateTime<Utc>) -> String {
        format!("payments-{}.{}", at.to_rfc3339(), self.format.extension())
    }
}

/// Binary export returned by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl ExportedFile {
    /// Write the file into `dir` under its suggested name
    ///
    /// Characters that are awkward in file names (`:`) are replaced.
    pub async fn save_in(&self, dir: impl AsRef<Path>) -> FitHubResult<PathBuf> {
        let path = dir.as_ref().join(self.file_name.replace(':', "-"));
        tokio::fs::write(&path, &self.content).await?;
        Ok(path)
    }
}
