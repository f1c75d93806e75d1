use std::collections::HashMap;

use crate::audit_log::{AuditEntry, AuditStatus};
use crate::stock::{StockItem, StockStatus};

pub const MISSING_NOT_SCANNED: &str = "Missing – Not Scanned";

/// Presentation-only audit state of a stock item. Derived from the item and
/// the audit log; never written back to either table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The most recent scan of the IMEI.
    Scanned {
        status: AuditStatus,
        audit_date: String,
    },
    /// In stock but never scanned.
    Missing,
    /// Sold and never scanned.
    NotApplicable,
}

impl AuditOutcome {
    pub fn status_label(&self) -> &str {
        match self {
            AuditOutcome::Scanned { status, .. } => status.as_ref(),
            AuditOutcome::Missing => MISSING_NOT_SCANNED,
            AuditOutcome::NotApplicable => "",
        }
    }

    pub fn timestamp(&self) -> &str {
        match self {
            AuditOutcome::Scanned { audit_date, .. } => audit_date,
            AuditOutcome::Missing | AuditOutcome::NotApplicable => "",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub audited: usize,
    pub sold_found: usize,
    pub missing: usize,
    pub not_applicable: usize,
}

impl ReconcileSummary {
    pub fn total(&self) -> usize {
        self.audited + self.sold_found + self.missing + self.not_applicable
    }
}

pub struct Reconciler;

impl Reconciler {
    /// Pairs every stock item, in stock order, with its audit outcome.
    ///
    /// When an IMEI was scanned more than once the entry with the highest
    /// `audit_id` wins, whatever its `audit_date` and wherever it sits in
    /// `entries`.
    pub fn reconcile<'a>(
        items: &'a [StockItem],
        entries: &[AuditEntry],
    ) -> Vec<(&'a StockItem, AuditOutcome)> {
        let mut latest: HashMap<&str, &AuditEntry> = HashMap::with_capacity(entries.len());
        for entry in entries {
            latest
                .entry(entry.imei())
                .and_modify(|current| {
                    if entry.audit_id() > current.audit_id() {
                        *current = entry;
                    }
                })
                .or_insert(entry);
        }

        items
            .iter()
            .map(|item| {
                let outcome = match latest.get(item.imei()) {
                    Some(entry) => AuditOutcome::Scanned {
                        status: entry.status(),
                        audit_date: entry.audit_date().to_owned(),
                    },
                    None if item.status() == StockStatus::InStock => AuditOutcome::Missing,
                    None => AuditOutcome::NotApplicable,
                };
                (item, outcome)
            })
            .collect()
    }

    pub fn summarize(reconciled: &[(&StockItem, AuditOutcome)]) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();

        for (_, outcome) in reconciled {
            let target = match outcome {
                AuditOutcome::Scanned { status: AuditStatus::Audited, .. } => &mut summary.audited,
                AuditOutcome::Scanned { status: AuditStatus::SoldFound, .. } => &mut summary.sold_found,
                AuditOutcome::Missing => &mut summary.missing,
                AuditOutcome::NotApplicable => &mut summary.not_applicable,
            };
            *target += 1;
        }

        summary
    }
}
