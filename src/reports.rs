use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use log::{info, Level};
use logging_timer::timer;
use rusqlite::Connection;
use rust_xlsxwriter::{Format, Workbook};

use crate::audit_log::{AuditEntry, AuditLog};
use crate::error::StockError;
use crate::reconcile::Reconciler;
use crate::stock::StockItem;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const STOCK_HEADER: [&str; 11] = [
    "IMEI",
    "Product",
    "Company",
    "Model",
    "Specification",
    "Purchase Date",
    "Purchase From",
    "Purchase Amount",
    "Status",
    "Sold To",
    "Sold Date",
];

const AUDIT_HEADER: [&str; 12] = [
    "IMEI",
    "Product",
    "Company",
    "Model",
    "Specification",
    "Purchase Date",
    "Received From",
    "Status",
    "Sold To",
    "Sold Date",
    "Audit Status",
    "Audit Timestamp",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Stock,
    Audit,
}

impl ReportKind {
    pub fn sheet_title(&self) -> &'static str {
        match self {
            ReportKind::Stock => "Stock Inventory",
            ReportKind::Audit => "Full Audit Report",
        }
    }

    pub fn file_prefix(&self) -> &'static str {
        match self {
            ReportKind::Stock => "stock_inventory",
            ReportKind::Audit => "audit_report",
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            ReportKind::Stock => &STOCK_HEADER,
            ReportKind::Audit => &AUDIT_HEADER,
        }
    }

    /// `<prefix>_<YYYYMMDD_HHMMSS>.xlsx`
    pub fn filename(&self, generated_at: NaiveDateTime) -> String {
        format!(
            "{}_{}.xlsx",
            self.file_prefix(),
            generated_at.format("%Y%m%d_%H%M%S")
        )
    }
}

impl FromStr for ReportKind {
    type Err = StockError;
    fn from_str(s: &str) -> Result<Self, StockError> {
        match s.to_lowercase().as_str() {
            "stock" => Ok(ReportKind::Stock),
            "audit" => Ok(ReportKind::Audit),
            _ => Err(StockError::Error(format!("Invalid report kind: '{}'", s))),
        }
    }
}

/// A tabular report: one header row plus data rows, all cells as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    kind: ReportKind,
    rows: Vec<Vec<String>>,
}

impl Report {
    /// Reads the tables `kind` needs inside one read transaction, so the audit
    /// report sees stock and scans from the same snapshot.
    pub fn generate(conn: &mut Connection, kind: ReportKind) -> Result<Self, StockError> {
        let tx = conn.transaction()?;
        let items = StockItem::list_all(&tx)?;

        let report = match kind {
            ReportKind::Stock => Report::stock(&items),
            ReportKind::Audit => {
                let entries = AuditLog::list_all(&tx)?;
                Report::audit(&items, &entries)
            }
        };

        tx.commit()?;

        Ok(report)
    }

    /// Every stock item verbatim, including the empty Purchase Amount column.
    pub fn stock(items: &[StockItem]) -> Self {
        let _tmr = timer!(Level::Trace; "Report::stock", "{} items", items.len());

        Report {
            kind: ReportKind::Stock,
            rows: items.iter().map(StockItem::to_row).collect(),
        }
    }

    /// Every stock item with its reconciled audit status and timestamp.
    pub fn audit(items: &[StockItem], entries: &[AuditEntry]) -> Self {
        let _tmr = timer!(Level::Trace; "Report::audit", "{} items, {} scans", items.len(), entries.len());

        let rows = Reconciler::reconcile(items, entries)
            .into_iter()
            .map(|(item, outcome)| {
                vec![
                    item.imei().to_owned(),
                    item.product().to_owned(),
                    item.company().to_owned(),
                    item.model().to_owned(),
                    item.specification().to_owned(),
                    item.purchase_date().to_owned(),
                    item.received_from().to_owned(),
                    item.status().to_string(),
                    item.sold_to().to_owned(),
                    item.sold_date().to_owned(),
                    outcome.status_label().to_owned(),
                    outcome.timestamp().to_owned(),
                ]
            })
            .collect();

        Report {
            kind: ReportKind::Audit,
            rows,
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn header(&self) -> &'static [&'static str] {
        self.kind.header()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Renders the report as an `.xlsx` workbook with a single sheet.
    pub fn to_xlsx(&self) -> Result<Vec<u8>, StockError> {
        let _tmr = timer!(Level::Trace; "Report::to_xlsx", "{} rows", self.rows.len());

        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(self.kind.sheet_title())?;

        for (col, title) in self.header().iter().enumerate() {
            let col = col as u16;
            worksheet.write_string_with_format(0, col, *title, &header_format)?;
            worksheet.set_column_width(col, 16)?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (idx, row) in self.rows.iter().enumerate() {
            let row_num = (idx + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(row_num, col as u16, value)?;
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// Writes the workbook into `dir` under its timestamped filename and
    /// returns the full path.
    pub fn write_to_dir(&self, dir: &Path, generated_at: NaiveDateTime) -> Result<PathBuf, StockError> {
        let path = dir.join(self.kind.filename(generated_at));
        fs::write(&path, self.to_xlsx()?)?;

        info!("Wrote {} report with {} rows to {}", self.kind.file_prefix(), self.rows.len(), path.display());

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit_log::test_support::scan;
    use crate::database::test_support::temp_db;
    use crate::stock::test_support::{purchase, sale};
    use calamine::{open_workbook_from_rs, Reader, Xlsx};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 30)
            .unwrap()
    }

    /// Reads the named sheet back as rows of strings.
    fn read_back(bytes: Vec<u8>, sheet: &str) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range(sheet).unwrap();
        range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_filenames() {
        assert_eq!(
            ReportKind::Stock.filename(generated_at()),
            "stock_inventory_20240309_070530.xlsx"
        );
        assert_eq!(
            ReportKind::Audit.filename(generated_at()),
            "audit_report_20240309_070530.xlsx"
        );
    }

    #[test]
    fn test_report_kind_from_str() {
        assert_eq!("stock".parse::<ReportKind>().unwrap(), ReportKind::Stock);
        assert_eq!("AUDIT".parse::<ReportKind>().unwrap(), ReportKind::Audit);
        assert!("sales".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_stock_report_rows() {
        let (_dir, db) = temp_db();
        let mut conn = db.get_connection().unwrap();

        StockItem::create(&conn, &purchase("1")).unwrap();
        StockItem::create(&conn, &purchase("2")).unwrap();
        StockItem::record_sale(&mut conn, &sale("2", "Alice", "2024-01-05")).unwrap();

        let items = StockItem::list_all(&conn).unwrap();
        let report = Report::stock(&items);

        assert_eq!(report.header().len(), 11);
        assert_eq!(report.header()[7], "Purchase Amount");
        assert_eq!(report.rows().len(), items.len());
        assert_eq!(report.rows()[1], items[1].to_row());
        assert_eq!(report.rows()[1][8], "Sold");
        assert_eq!(report.rows()[0][7], "");
    }

    #[test]
    fn test_audit_report_rows() {
        let (_dir, db) = temp_db();
        let mut conn = db.get_connection().unwrap();

        StockItem::create(&conn, &purchase("1")).unwrap();
        StockItem::create(&conn, &purchase("2")).unwrap();
        StockItem::create(&conn, &purchase("3")).unwrap();
        StockItem::record_sale(&mut conn, &sale("3", "Carol", "2024-01-07")).unwrap();
        AuditLog::append(&conn, &scan("1", "Audited", "2024-02-01 10:00")).unwrap();

        let items = StockItem::list_all(&conn).unwrap();
        let entries = AuditLog::list_all(&conn).unwrap();
        let report = Report::audit(&items, &entries);

        assert_eq!(report.header().len(), 12);
        assert_eq!(
            report.rows()[0],
            vec![
                "1", "Phone", "Acme", "A-1", "8GB/128GB", "2024-01-01", "Wholesale Ltd",
                "In Stock", "", "", "Audited", "2024-02-01 10:00",
            ]
        );
        assert_eq!(report.rows()[1][10], "Missing – Not Scanned");
        assert_eq!(report.rows()[1][11], "");
        assert_eq!(report.rows()[2][7], "Sold");
        assert_eq!(report.rows()[2][10], "");
    }

    #[test]
    fn test_generate_reads_current_tables() {
        let (_dir, db) = temp_db();
        let mut conn = db.get_connection().unwrap();

        StockItem::create(&conn, &purchase("1")).unwrap();
        AuditLog::append(&conn, &scan("1", "Audited", "2024-02-01")).unwrap();

        let stock = Report::generate(&mut conn, ReportKind::Stock).unwrap();
        assert_eq!(stock.kind(), ReportKind::Stock);
        assert_eq!(stock.rows().len(), 1);

        let audit = Report::generate(&mut conn, ReportKind::Audit).unwrap();
        assert_eq!(audit.kind(), ReportKind::Audit);
        assert_eq!(audit.rows()[0][10], "Audited");
    }

    #[test]
    fn test_stock_xlsx_round_trip() {
        let (_dir, db) = temp_db();
        let conn = db.get_connection().unwrap();

        for imei in ["10", "20", "30"] {
            StockItem::create(&conn, &purchase(imei)).unwrap();
        }

        let items = StockItem::list_all(&conn).unwrap();
        let bytes = Report::stock(&items).to_xlsx().unwrap();
        let rows = read_back(bytes, "Stock Inventory");

        assert_eq!(rows.len(), items.len() + 1);
        assert_eq!(rows[0], STOCK_HEADER.to_vec());
        assert_eq!(rows[0].len(), 11);
        assert_eq!(rows[2][0], "20");
        assert_eq!(rows[2][8], "In Stock");
    }

    #[test]
    fn test_audit_xlsx_round_trip() {
        let (_dir, db) = temp_db();
        let conn = db.get_connection().unwrap();

        StockItem::create(&conn, &purchase("10")).unwrap();
        StockItem::create(&conn, &purchase("20")).unwrap();
        AuditLog::append(&conn, &scan("20", "Audited", "2024-02-01 10:00")).unwrap();

        let items = StockItem::list_all(&conn).unwrap();
        let entries = AuditLog::list_all(&conn).unwrap();
        let bytes = Report::audit(&items, &entries).to_xlsx().unwrap();
        let rows = read_back(bytes, "Full Audit Report");

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], AUDIT_HEADER.to_vec());
        assert_eq!(rows[1][10], "Missing – Not Scanned");
        assert_eq!(rows[2][10], "Audited");
        assert_eq!(rows[2][11], "2024-02-01 10:00");
    }

    #[test]
    fn test_empty_stock_report_has_header_only() {
        let bytes = Report::stock(&[]).to_xlsx().unwrap();
        let rows = read_back(bytes, "Stock Inventory");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 11);
    }

    #[test]
    fn test_write_to_dir() {
        let out = tempfile::tempdir().unwrap();
        let path = Report::stock(&[]).write_to_dir(out.path(), generated_at()).unwrap();

        assert_eq!(path, out.path().join("stock_inventory_20240309_070530.xlsx"));
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
