use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};

/// Date format accepted for issue and due dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A receivable issued by a drawer against a drawee.
///
/// Values of this type have passed ingestion: every field is present, dates
/// are parsed and the value is a positive finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRecord {
    pub id: String,
    pub drawer: String,
    pub drawee: String,
    pub value: f64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub document_type: String,
    pub has_fiscal_document: bool,
    pub status: String,
}

impl DuplicateRecord {
    /// Signed number of days between issue and due date.
    pub fn days_to_due(&self) -> i64 {
        (self.due_date - self.issue_date).num_days()
    }

    pub fn issued_on_weekend(&self) -> bool {
        matches!(self.issue_date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Unvalidated record as handed over by an ingestion layer (CSV, JSON).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDuplicateRecord {
    pub id: Option<String>,
    pub drawer: Option<String>,
    pub drawee: Option<String>,
    pub value: Option<f64>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub document_type: Option<String>,
    pub has_fiscal_document: Option<bool>,
    pub status: Option<String>,
}

fn required_text(value: Option<&str>, index: usize, field: &'static str) -> Result<String> {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ScoringError::invalid_record(index, field, "missing required field")),
    }
}

fn parse_date(value: Option<&str>, index: usize, field: &'static str) -> Result<NaiveDate> {
    let raw = required_text(value, index, field)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
        ScoringError::invalid_record(index, field, format!("unparseable date '{}': {}", raw, e))
    })
}

fn check_value(value: f64, index: usize) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ScoringError::invalid_record(
            index,
            "value",
            format!("value must be a positive finite number, got {}", value),
        ));
    }
    Ok(())
}

impl RawDuplicateRecord {
    /// Convert into a validated record. `index` is the position in the batch
    /// and is only used for error reporting.
    pub fn into_record(self, index: usize) -> Result<DuplicateRecord> {
        let value = self
            .value
            .ok_or_else(|| ScoringError::invalid_record(index, "value", "missing required field"))?;
        check_value(value, index)?;

        let has_fiscal_document = self.has_fiscal_document.ok_or_else(|| {
            ScoringError::invalid_record(index, "has_fiscal_document", "missing required field")
        })?;

        Ok(DuplicateRecord {
            id: required_text(self.id.as_deref(), index, "id")?,
            drawer: required_text(self.drawer.as_deref(), index, "drawer")?,
            drawee: required_text(self.drawee.as_deref(), index, "drawee")?,
            value,
            issue_date: parse_date(self.issue_date.as_deref(), index, "issue_date")?,
            due_date: parse_date(self.due_date.as_deref(), index, "due_date")?,
            document_type: required_text(self.document_type.as_deref(), index, "document_type")?,
            has_fiscal_document,
            status: required_text(self.status.as_deref(), index, "status")?,
        })
    }
}

/// Convert a whole raw batch. The first malformed record rejects the batch;
/// nothing is silently dropped.
pub fn ingest_batch(raw: Vec<RawDuplicateRecord>) -> Result<Vec<DuplicateRecord>> {
    let records = raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_record(i))
        .collect::<Result<Vec<_>>>()?;
    validate_records(&records)?;
    Ok(records)
}

/// Record-level checks that also apply to already-typed input: positive
/// finite values, non-empty identifiers and batch-unique ids.
pub fn validate_records(records: &[DuplicateRecord]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if record.id.trim().is_empty() {
            return Err(ScoringError::invalid_record(i, "id", "missing required field"));
        }
        if record.drawer.trim().is_empty() {
            return Err(ScoringError::invalid_record(i, "drawer", "missing required field"));
        }
        if record.drawee.trim().is_empty() {
            return Err(ScoringError::invalid_record(i, "drawee", "missing required field"));
        }
        check_value(record.value, i)?;
        if !seen.insert(record.id.as_str()) {
            return Err(ScoringError::invalid_record(
                i,
                "id",
                format!("duplicate id '{}' within batch", record.id),
            ));
        }
    }
    Ok(())
}
