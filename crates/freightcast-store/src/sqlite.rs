use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use freightcast_models::{HistoricalQuote, IssuedQuote, NewQuote};
use rusqlite::types::Value;
use rusqlite::Connection;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{CatalogLoad, DistanceUpdate, QuoteStore};

/// SQLite-backed quote store.
///
/// File databases run in WAL mode so the backfill binary can write while
/// the estimator reads.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `path`. Creates the schema if missing.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(freightcast_models::store_schema::STORE_DDL)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database with the schema applied. Useful for testing.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(freightcast_models::store_schema::STORE_DDL)?;
        Ok(Self { conn })
    }

    /// Raw connection access, for seeding rows the typed API refuses to write.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl QuoteStore for SqliteStore {
    fn load_quotes(&self) -> Result<CatalogLoad, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT quote_id, origin_city, destination_city, cargo_type, modality, carrier, \
             freight_value, cargo_weight_kg, lead_time_days, distance_km, quote_timestamp \
             FROM freight_quotes ORDER BY quote_id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawQuoteRow {
                    quote_id: row.get(0)?,
                    origin_city: row.get(1)?,
                    destination_city: row.get(2)?,
                    cargo_type: row.get(3)?,
                    modality: row.get(4)?,
                    carrier: row.get(5)?,
                    freight_value: row.get(6)?,
                    cargo_weight_kg: row.get(7)?,
                    lead_time_days: row.get(8)?,
                    distance_km: row.get(9)?,
                    quote_timestamp: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut load = CatalogLoad::default();
        for raw in rows {
            let quote_id = raw.quote_id;
            match raw.into_quote() {
                Ok(quote) => load.quotes.push(quote),
                Err(reason) => {
                    warn!(quote_id, reason = %reason, "Skipping malformed quote");
                    load.skipped += 1;
                }
            }
        }

        debug!(
            loaded = load.quotes.len(),
            skipped = load.skipped,
            "Loaded historical quotes"
        );
        Ok(load)
    }

    fn update_distances(&mut self, updates: &[DistanceUpdate]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let mut updated = 0;
        {
            let mut stmt =
                tx.prepare_cached("UPDATE freight_quotes SET distance_km = ?1 WHERE quote_id = ?2")?;
            for update in updates {
                updated += stmt.execute(rusqlite::params![update.distance_km, update.quote_id])?;
            }
        }
        tx.commit()?;
        Ok(updated)
    }

    fn insert_quotes(&mut self, quotes: &[NewQuote]) -> Result<Vec<i64>, StoreError> {
        for (index, quote) in quotes.iter().enumerate() {
            quote
                .check()
                .map_err(|reason| StoreError::InvalidQuote { index, reason })?;
        }

        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(quotes.len());
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO freight_quotes \
                 (origin_city, destination_city, cargo_type, modality, carrier, \
                  freight_value, cargo_weight_kg, lead_time_days, distance_km, quote_timestamp) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for quote in quotes {
                stmt.execute(rusqlite::params![
                    quote.origin_city,
                    quote.destination_city,
                    quote.cargo_type,
                    quote.modality,
                    quote.carrier,
                    quote.freight_value.to_string(),
                    quote.cargo_weight_kg,
                    quote.lead_time_days,
                    quote.distance_km,
                    quote.quoted_at.to_rfc3339(),
                ])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    fn insert_issued(&self, issued: &IssuedQuote) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO issued_quotes \
             (id, user_name, origin_city, destination_city, cargo_type, modality, cargo_weight_kg, \
              carrier, estimated_value, lead_time_days, sample_count, period, issued_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            rusqlite::params![
                issued.id.to_string(),
                issued.user,
                issued.origin_city,
                issued.destination_city,
                issued.cargo_type,
                issued.modality,
                issued.cargo_weight_kg,
                issued.carrier,
                issued.estimated_value.to_string(),
                issued.lead_time_days,
                issued.sample_count as i64,
                issued.period,
                issued.issued_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn recent_issued(&self, limit: usize) -> Result<Vec<IssuedQuote>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, user_name, origin_city, destination_city, cargo_type, modality, \
             cargo_weight_kg, carrier, estimated_value, lead_time_days, sample_count, period, issued_at \
             FROM issued_quotes ORDER BY issued_at DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(rusqlite::params![limit as i64], |row| {
                Ok(RawIssuedRow {
                    id: row.get(0)?,
                    user: row.get(1)?,
                    origin_city: row.get(2)?,
                    destination_city: row.get(3)?,
                    cargo_type: row.get(4)?,
                    modality: row.get(5)?,
                    cargo_weight_kg: row.get(6)?,
                    carrier: row.get(7)?,
                    estimated_value: row.get(8)?,
                    lead_time_days: row.get(9)?,
                    sample_count: row.get(10)?,
                    period: row.get(11)?,
                    issued_at: row.get(12)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawIssuedRow::into_issued).collect()
    }
}

/// A quote row before its loosely-typed columns have been validated.
struct RawQuoteRow {
    quote_id: i64,
    origin_city: String,
    destination_city: String,
    cargo_type: String,
    modality: String,
    carrier: String,
    freight_value: Value,
    cargo_weight_kg: Value,
    lead_time_days: Value,
    distance_km: Value,
    quote_timestamp: Option<String>,
}

impl RawQuoteRow {
    fn into_quote(self) -> Result<HistoricalQuote, String> {
        let freight_value = decimal_from(&self.freight_value)
            .filter(|v| v.is_sign_positive() && !v.is_zero())
            .ok_or_else(|| format!("freight_value not a positive number: {:?}", self.freight_value))?;
        let cargo_weight_kg = f64_from(&self.cargo_weight_kg)
            .filter(|w| w.is_finite() && *w > 0.0)
            .ok_or_else(|| format!("cargo_weight_kg not a positive number: {:?}", self.cargo_weight_kg))?;
        let lead_time_days = lead_time_from(&self.lead_time_days)
            .ok_or_else(|| format!("lead_time_days not a whole number of days: {:?}", self.lead_time_days))?;
        let quoted_at = self
            .quote_timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| format!("unparseable quote_timestamp: {:?}", self.quote_timestamp))?;

        Ok(HistoricalQuote {
            quote_id: self.quote_id,
            origin_city: self.origin_city,
            destination_city: self.destination_city,
            cargo_type: self.cargo_type,
            modality: self.modality,
            carrier: self.carrier,
            freight_value,
            cargo_weight_kg,
            lead_time_days,
            distance_km: f64_from(&self.distance_km).filter(|d| d.is_finite()),
            quoted_at,
        })
    }
}

struct RawIssuedRow {
    id: String,
    user: String,
    origin_city: String,
    destination_city: String,
    cargo_type: String,
    modality: String,
    cargo_weight_kg: f64,
    carrier: String,
    estimated_value: String,
    lead_time_days: u32,
    sample_count: i64,
    period: String,
    issued_at: String,
}

impl RawIssuedRow {
    fn into_issued(self) -> Result<IssuedQuote, StoreError> {
        let corrupt = |reason: String| StoreError::CorruptAudit {
            id: self.id.clone(),
            reason,
        };
        let id = Uuid::parse_str(&self.id).map_err(|e| corrupt(format!("id: {e}")))?;
        let estimated_value = Decimal::from_str(&self.estimated_value)
            .map_err(|e| corrupt(format!("estimated_value: {e}")))?;
        let issued_at = parse_timestamp(&self.issued_at)
            .ok_or_else(|| corrupt(format!("issued_at: {}", self.issued_at)))?;

        Ok(IssuedQuote {
            id,
            user: self.user,
            origin_city: self.origin_city,
            destination_city: self.destination_city,
            cargo_type: self.cargo_type,
            modality: self.modality,
            cargo_weight_kg: self.cargo_weight_kg,
            carrier: self.carrier,
            estimated_value,
            lead_time_days: self.lead_time_days,
            sample_count: self.sample_count.max(0) as usize,
            period: self.period,
            issued_at,
        })
    }
}

fn decimal_from(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(i) => Some(Decimal::from(*i)),
        Value::Real(f) => Decimal::from_f64(*f),
        Value::Text(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn f64_from(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Real(f) => Some(*f),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lead_time_from(value: &Value) -> Option<u32> {
    match value {
        Value::Integer(i) => u32::try_from(*i).ok(),
        Value::Real(f) if *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64 => Some(*f as u32),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse the timestamp formats found in quote exports: RFC 3339, naive
/// date-times (taken as UTC) and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn new_quote(carrier: &str, value: Decimal, weight: f64) -> NewQuote {
        NewQuote {
            origin_city: "Campinas".to_string(),
            destination_city: "Curitiba".to_string(),
            cargo_type: "Paletizada".to_string(),
            modality: "Rodoviário".to_string(),
            carrier: carrier.to_string(),
            freight_value: value,
            cargo_weight_kg: weight,
            lead_time_days: 3,
            distance_km: None,
            quoted_at: Utc.with_ymd_and_hms(2026, 8, 20, 9, 30, 0).unwrap(),
        }
    }

    fn insert_raw(store: &SqliteStore, value: &str, weight: &str, timestamp: Option<&str>) {
        store
            .connection()
            .execute(
                "INSERT INTO freight_quotes \
                 (origin_city, destination_city, cargo_type, modality, carrier, \
                  freight_value, cargo_weight_kg, lead_time_days, distance_km, quote_timestamp) \
                 VALUES ('Campinas', 'Curitiba', 'Paletizada', 'Rodoviário', 'Raw', ?1, ?2, 2, NULL, ?3)",
                rusqlite::params![value, weight, timestamp],
            )
            .unwrap();
    }

    #[test]
    fn insert_and_load_roundtrip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let ids = store
            .insert_quotes(&[
                new_quote("TransSul", dec!(1250.50), 500.0),
                new_quote("Rápido Norte", dec!(900), 300.0),
            ])
            .unwrap();
        assert_eq!(ids.len(), 2);

        let load = store.load_quotes().unwrap();
        assert_eq!(load.skipped, 0);
        assert_eq!(load.quotes.len(), 2);

        let first = &load.quotes[0];
        assert_eq!(first.quote_id, ids[0]);
        assert_eq!(first.carrier, "TransSul");
        assert_eq!(first.freight_value, dec!(1250.5));
        assert_eq!(first.cargo_weight_kg, 500.0);
        assert_eq!(first.distance_km, None);
        assert_eq!(
            first.quoted_at,
            Utc.with_ymd_and_hms(2026, 8, 20, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_quotes(&[new_quote("TransSul", dec!(1000), 400.0)])
            .unwrap();
        insert_raw(&store, "not-a-number", "100", Some("2026-05-01"));
        insert_raw(&store, "500", "0", Some("2026-05-01"));
        insert_raw(&store, "500", "100", Some("01/05/2026"));
        insert_raw(&store, "500", "100", None);
        insert_raw(&store, "500", "100", Some("2026-05-01 14:00:00"));

        let load = store.load_quotes().unwrap();
        assert_eq!(load.skipped, 4);
        assert_eq!(load.quotes.len(), 2);
        assert_eq!(load.quotes[1].carrier, "Raw");
        assert_eq!(load.quotes[1].freight_value, dec!(500));
    }

    #[test]
    fn update_distances_in_one_batch() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let ids = store
            .insert_quotes(&[
                new_quote("A", dec!(100), 10.0),
                new_quote("B", dec!(100), 10.0),
                new_quote("C", dec!(100), 10.0),
            ])
            .unwrap();

        let updated = store
            .update_distances(&[
                DistanceUpdate {
                    quote_id: ids[0],
                    distance_km: 95.12,
                },
                DistanceUpdate {
                    quote_id: ids[2],
                    distance_km: 410.0,
                },
                DistanceUpdate {
                    quote_id: 9_999,
                    distance_km: 1.0,
                },
            ])
            .unwrap();
        assert_eq!(updated, 2);

        let quotes = store.load_quotes().unwrap().quotes;
        assert_eq!(quotes[0].distance_km, Some(95.12));
        assert_eq!(quotes[1].distance_km, None);
        assert_eq!(quotes[2].distance_km, Some(410.0));
    }

    #[test]
    fn issued_quotes_most_recent_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
        for (i, user) in ["ana", "bruno", "carla"].iter().enumerate() {
            store
                .insert_issued(&IssuedQuote {
                    id: Uuid::new_v4(),
                    user: user.to_string(),
                    origin_city: "Campinas".to_string(),
                    destination_city: "Curitiba".to_string(),
                    cargo_type: "Paletizada".to_string(),
                    modality: "Rodoviário".to_string(),
                    cargo_weight_kg: 1000.0,
                    carrier: "TransSul".to_string(),
                    estimated_value: dec!(2500.10),
                    lead_time_days: 3,
                    sample_count: 5,
                    period: "2026-04 to 2026-10".to_string(),
                    issued_at: base + Duration::hours(i as i64),
                })
                .unwrap();
        }

        let recent = store.recent_issued(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].user, "carla");
        assert_eq!(recent[1].user, "bruno");
        assert_eq!(recent[0].estimated_value, dec!(2500.10));
    }

    #[test]
    fn parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 4, 15, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-03-04T15:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-04T12:30:00-03:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-04 15:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-04T15:30:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2026-03-04"),
            Some(Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("04/03/2026"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn wal_mode_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.db");
        let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
        let mode: String = store
            .connection()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn invalid_quote_rejects_whole_batch() {
        let mut store = SqliteStore::open_in_memory().unwrap();

        let err = store
            .insert_quotes(&[
                new_quote("TransSul", dec!(1200), 400.0),
                new_quote("Rota Brasil", dec!(-5), 400.0),
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuote { index: 1, .. }), "{err}");

        let err = store
            .insert_quotes(&[new_quote("TransSul", dec!(1200), 0.0)])
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuote { index: 0, .. }), "{err}");

        let err = store
            .insert_quotes(&[new_quote("", dec!(1200), 400.0)])
            .unwrap_err();
        assert!(err.to_string().contains("carrier is empty"));

        assert!(store.load_quotes().unwrap().quotes.is_empty());
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("nested").join("quotes.db");
        SqliteStore::open(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }
}
