/// Table holding historical freight quotes.
pub const QUOTES_TABLE: &str = "freight_quotes";

/// Table holding the audit trail of estimates handed to users.
pub const ISSUED_QUOTES_TABLE: &str = "issued_quotes";

/// The SQLite schema freightcast reads from and writes to.
///
/// Numeric columns use NUMERIC affinity rather than strict types: rows
/// imported by other tools may hold text there, and such rows are skipped
/// at load time instead of failing the whole catalog.
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS freight_quotes (
///     quote_id          INTEGER PRIMARY KEY AUTOINCREMENT,
///     origin_city       TEXT NOT NULL,
///     destination_city  TEXT NOT NULL,
///     cargo_type        TEXT NOT NULL,
///     modality          TEXT NOT NULL,
///     carrier           TEXT NOT NULL,
///     freight_value     NUMERIC,
///     cargo_weight_kg   NUMERIC,
///     lead_time_days    NUMERIC,
///     distance_km       REAL,
///     quote_timestamp   TEXT
/// );
/// ```
pub const STORE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS freight_quotes (
    quote_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    origin_city       TEXT NOT NULL,
    destination_city  TEXT NOT NULL,
    cargo_type        TEXT NOT NULL,
    modality          TEXT NOT NULL,
    carrier           TEXT NOT NULL,
    freight_value     NUMERIC,
    cargo_weight_kg   NUMERIC,
    lead_time_days    NUMERIC,
    distance_km       REAL,
    quote_timestamp   TEXT
);
CREATE INDEX IF NOT EXISTS idx_quotes_route
    ON freight_quotes(origin_city, destination_city, cargo_type, modality);
CREATE TABLE IF NOT EXISTS issued_quotes (
    id                TEXT PRIMARY KEY,
    user_name         TEXT NOT NULL,
    origin_city       TEXT NOT NULL,
    destination_city  TEXT NOT NULL,
    cargo_type        TEXT NOT NULL,
    modality          TEXT NOT NULL,
    cargo_weight_kg   REAL NOT NULL,
    carrier           TEXT NOT NULL,
    estimated_value   TEXT NOT NULL,
    lead_time_days    INTEGER NOT NULL,
    sample_count      INTEGER NOT NULL,
    period            TEXT NOT NULL,
    issued_at         TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_issued_at ON issued_quotes(issued_at);
";
