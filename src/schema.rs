pub const SCHEMA_VERSION: &str = "1";

pub const CREATE_SCHEMA_SQL: &str = r#"
BEGIN TRANSACTION;

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', '1');

-- One row per physical device. Column order is significant: it is the
-- positional order of /api/inventory and of the stock report.
CREATE TABLE IF NOT EXISTS stock (
    imei TEXT NOT NULL UNIQUE,
    product TEXT NOT NULL,
    company TEXT NOT NULL,
    model TEXT NOT NULL,
    specification TEXT NOT NULL,
    purchase_date TEXT NOT NULL,
    received_from TEXT NOT NULL,
    purchase_amount TEXT NOT NULL DEFAULT '',   -- Placeholder, never written by the application
    status TEXT NOT NULL DEFAULT 'In Stock' CHECK (status IN ('In Stock', 'Sold')),
    sold_to TEXT NOT NULL DEFAULT '',
    sold_date TEXT NOT NULL DEFAULT ''
);

-- Append-only scan events. audit_id is the insertion sequence used to pick
-- the most recent scan of an IMEI. imei is deliberately not a foreign key.
CREATE TABLE IF NOT EXISTS audit_log (
    audit_id INTEGER PRIMARY KEY AUTOINCREMENT,
    imei TEXT NOT NULL,
    model TEXT DEFAULT NULL,
    status TEXT NOT NULL CHECK (status IN ('Audited', 'Sold-Found')),
    audit_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_audit_log_imei ON audit_log (imei, audit_id);

COMMIT;
"#;
