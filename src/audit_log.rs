use log::info;
use rusqlite::{named_params, Connection, Row};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use crate::error::StockError;
use crate::stock::require_fields;

#[derive(AsRefStr, Display, EnumString, Debug, PartialEq, Eq, Copy, Clone)]
pub enum AuditStatus {
    #[strum(serialize = "Audited")]
    Audited,
    #[strum(serialize = "Sold-Found")]
    SoldFound,
}

/// One scan event. Entries are never updated or deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditEntry {
    audit_id: i64,
    imei: String,
    model: Option<String>,
    status: AuditStatus,
    audit_date: String,
}

/// Body of `POST /log_audit`.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NewAuditEntry {
    #[serde(deserialize_with = "text_or_number")]
    pub imei: String,
    pub status: String,
    pub model: Option<String>,
    pub audit_date: String,
}

/// Scanners may submit the IMEI as a bare JSON number.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

impl NewAuditEntry {
    pub fn validate(&self) -> Result<AuditStatus, StockError> {
        require_fields(&[
            ("imei", self.imei.as_str()),
            ("status", self.status.as_str()),
            ("audit_date", self.audit_date.as_str()),
        ])?;

        self.status.trim().parse::<AuditStatus>().map_err(|_| {
            StockError::Validation(format!(
                "Invalid audit status: '{}' (expected '{}' or '{}')",
                self.status,
                AuditStatus::Audited,
                AuditStatus::SoldFound
            ))
        })
    }
}

pub struct AuditLog;

impl AuditLog {
    fn entry_from_row(row: &Row) -> rusqlite::Result<AuditEntry> {
        let status_str: String = row.get(3)?;
        let status = status_str.parse::<AuditStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(AuditEntry {
            audit_id: row.get(0)?,
            imei: row.get(1)?,
            model: row.get(2)?,
            status,
            audit_date: row.get(4)?,
        })
    }

    /// Appends a scan event. The IMEI is not checked against the stock table:
    /// scans of unknown or sold devices are recorded as-is.
    pub fn append(conn: &Connection, new_entry: &NewAuditEntry) -> Result<AuditEntry, StockError> {
        let status = new_entry.validate()?;

        let model = new_entry
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned);

        let sql = r#"
            INSERT INTO audit_log (imei, model, status, audit_date)
            VALUES (:imei, :model, :status, :audit_date)
            RETURNING audit_id
        "#;

        let audit_id: i64 = conn.query_row(
            sql,
            named_params! {
                ":imei":        new_entry.imei.trim(),
                ":model":       model,
                ":status":      status.as_ref(),
                ":audit_date":  new_entry.audit_date.trim(),
            },
            |row| row.get(0),
        )?;

        info!("Logged audit scan #{} for IMEI {} ({})", audit_id, new_entry.imei.trim(), status);

        Ok(AuditEntry {
            audit_id,
            imei: new_entry.imei.trim().to_owned(),
            model,
            status,
            audit_date: new_entry.audit_date.trim().to_owned(),
        })
    }

    /// All entries in insertion order.
    pub fn list_all(conn: &Connection) -> Result<Vec<AuditEntry>, StockError> {
        let mut stmt = conn.prepare(
            "SELECT audit_id, imei, model, status, audit_date
            FROM audit_log
            ORDER BY audit_id ASC",
        )?;

        let rows = stmt.query_map([], Self::entry_from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }

        Ok(entries)
    }
}

impl AuditEntry {
    pub fn audit_id(&self) -> i64 {
        self.audit_id
    }

    pub fn imei(&self) -> &str {
        &self.imei
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn status(&self) -> AuditStatus {
        self.status
    }

    pub fn audit_date(&self) -> &str {
        &self.audit_date
    }
}

#[cfg(test)]
impl AuditEntry {
    pub(crate) fn new_for_test(audit_id: i64, imei: &str, status: AuditStatus, audit_date: &str) -> Self {
        AuditEntry {
            audit_id,
            imei: imei.to_owned(),
            model: None,
            status,
            audit_date: audit_date.to_owned(),
        }
    }
}
