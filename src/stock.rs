use log::info;
use rusqlite::{named_params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};
use serde::Deserialize;
use strum::{AsRefStr, Display, EnumString};

use crate::error::StockError;

#[derive(AsRefStr, Display, EnumString, Debug, PartialEq, Eq, Copy, Clone)]
pub enum StockStatus {
    #[strum(serialize = "In Stock")]
    InStock,
    #[strum(serialize = "Sold")]
    Sold,
}

/// One physical device in the `stock` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StockItem {
    imei: String,
    product: String,
    company: String,
    model: String,
    specification: String,
    purchase_date: String,
    received_from: String,
    purchase_amount: String, // Storage placeholder; always empty
    status: StockStatus,
    sold_to: String,
    sold_date: String,
}

/// Fields submitted by the purchase form.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewPurchase {
    pub imei: String,
    pub product: String,
    pub company: String,
    pub model: String,
    pub specification: String,
    pub purchase_date: String,
    pub received_from: String,
}

/// Fields submitted by the sale form.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewSale {
    pub imei: String,
    pub sold_to: String,
    pub sold_date: String,
}

/// Returns an error naming every field whose trimmed value is empty.
pub(crate) fn require_fields(fields: &[(&str, &str)]) -> Result<(), StockError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StockError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

impl NewPurchase {
    pub fn validate(&self) -> Result<(), StockError> {
        require_fields(&[
            ("imei", self.imei.as_str()),
            ("product", self.product.as_str()),
            ("company", self.company.as_str()),
            ("model", self.model.as_str()),
            ("specification", self.specification.as_str()),
            ("purchase_date", self.purchase_date.as_str()),
            ("received_from", self.received_from.as_str()),
        ])
    }
}

impl NewSale {
    pub fn validate(&self) -> Result<(), StockError> {
        require_fields(&[
            ("imei", self.imei.as_str()),
            ("sold_to", self.sold_to.as_str()),
            ("sold_date", self.sold_date.as_str()),
        ])
    }
}

impl StockItem {
    pub const COLUMN_COUNT: usize = 11;

    const SELECT_COLUMNS: &'static str = "imei, product, company, model, specification, purchase_date,
        received_from, purchase_amount, status, sold_to, sold_date";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status_str: String = row.get(8)?;
        let status = status_str.parse::<StockStatus>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(StockItem {
            imei: row.get(0)?,
            product: row.get(1)?,
            company: row.get(2)?,
            model: row.get(3)?,
            specification: row.get(4)?,
            purchase_date: row.get(5)?,
            received_from: row.get(6)?,
            purchase_amount: row.get(7)?,
            status,
            sold_to: row.get(9)?,
            sold_date: row.get(10)?,
        })
    }

    /// Records a purchase. The new item is "In Stock" with empty sale fields.
    pub fn create(conn: &Connection, purchase: &NewPurchase) -> Result<Self, StockError> {
        purchase.validate()?;

        let item = StockItem {
            imei: purchase.imei.trim().to_owned(),
            product: purchase.product.trim().to_owned(),
            company: purchase.company.trim().to_owned(),
            model: purchase.model.trim().to_owned(),
            specification: purchase.specification.trim().to_owned(),
            purchase_date: purchase.purchase_date.trim().to_owned(),
            received_from: purchase.received_from.trim().to_owned(),
            purchase_amount: String::new(),
            status: StockStatus::InStock,
            sold_to: String::new(),
            sold_date: String::new(),
        };

        let sql = r#"
            INSERT INTO stock (
                imei, product, company, model, specification,
                purchase_date, received_from, status, sold_to, sold_date
            )
            VALUES (
                :imei, :product, :company, :model, :specification,
                :purchase_date, :received_from, :status, '', ''
            )
        "#;

        let result = conn.execute(
            sql,
            named_params! {
                ":imei":            item.imei,
                ":product":         item.product,
                ":company":         item.company,
                ":model":           item.model,
                ":specification":   item.specification,
                ":purchase_date":   item.purchase_date,
                ":received_from":   item.received_from,
                ":status":          item.status.as_ref(),
            },
        );

        match result {
            Ok(_) => {
                info!("Recorded purchase of {} {} (IMEI {})", item.company, item.model, item.imei);
                Ok(item)
            }
            Err(rusqlite::Error::SqliteFailure(sqlite_err, _))
                if sqlite_err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StockError::Conflict(format!(
                    "An item with IMEI {} already exists",
                    item.imei
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Marks an "In Stock" item as sold. Unknown IMEIs are reported as
    /// `NotFound` and items that are already sold as `Conflict`, so the sale
    /// fields are written at most once.
    pub fn record_sale(conn: &mut Connection, sale: &NewSale) -> Result<Self, StockError> {
        sale.validate()?;

        let imei = sale.imei.trim();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = Self::get_by_imei(&tx, imei)?
            .ok_or_else(|| StockError::NotFound(format!("No item with IMEI {} in stock", imei)))?;

        if existing.status == StockStatus::Sold {
            return Err(StockError::Conflict(format!(
                "Item with IMEI {} was already sold to {} on {}",
                imei, existing.sold_to, existing.sold_date
            )));
        }

        tx.execute(
            "UPDATE stock
             SET status = :status, sold_to = :sold_to, sold_date = :sold_date
             WHERE imei = :imei",
            named_params! {
                ":status":      StockStatus::Sold.as_ref(),
                ":sold_to":     sale.sold_to.trim(),
                ":sold_date":   sale.sold_date.trim(),
                ":imei":        imei,
            },
        )?;

        tx.commit()?;

        info!("Recorded sale of IMEI {} to {}", imei, sale.sold_to.trim());

        Ok(StockItem {
            status: StockStatus::Sold,
            sold_to: sale.sold_to.trim().to_owned(),
            sold_date: sale.sold_date.trim().to_owned(),
            ..existing
        })
    }

    pub fn get_by_imei(conn: &Connection, imei: &str) -> Result<Option<Self>, StockError> {
        let sql = format!("SELECT {} FROM stock WHERE imei = ?", Self::SELECT_COLUMNS);

        conn.query_row(&sql, [imei], Self::from_row)
            .optional()
            .map_err(StockError::DatabaseError)
    }

    /// All items in insertion order.
    pub fn list_all(conn: &Connection) -> Result<Vec<Self>, StockError> {
        let sql = format!("SELECT {} FROM stock ORDER BY rowid ASC", Self::SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt.query_map([], Self::from_row)?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }

        Ok(items)
    }

    /// The item as its storage columns, in storage order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.imei.clone(),
            self.product.clone(),
            self.company.clone(),
            self.model.clone(),
            self.specification.clone(),
            self.purchase_date.clone(),
            self.received_from.clone(),
            self.purchase_amount.clone(),
            self.status.to_string(),
            self.sold_to.clone(),
            self.sold_date.clone(),
        ]
    }

    pub fn imei(&self) -> &str {
        &self.imei
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn specification(&self) -> &str {
        &self.specification
    }

    pub fn purchase_date(&self) -> &str {
        &self.purchase_date
    }

    pub fn received_from(&self) -> &str {
        &self.received_from
    }

    pub fn status(&self) -> StockStatus {
        self.status
    }

    pub fn sold_to(&self) -> &str {
        &self.sold_to
    }

    pub fn sold_date(&self) -> &str {
        &self.sold_date
    }
}
