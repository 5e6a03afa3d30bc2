pub mod errors;
pub mod models;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use crate::manager_db::errors::DBError;
use crate::manager_db::models::{NewRecord, RecordRow, WeatherRecord};

const SELECT_RECORD: &str =
    "SELECT id, location_name, location_query, latitude, longitude,
            start_date, end_date, weather_data, created_at, updated_at
        FROM weather_records";

pub struct DB {
    db_conn: Connection,
}

impl DB {

    /// Creates a new instance of DB
    ///
    /// # Arguments
    ///
    /// * 'db_path' - full path to db file, or ":memory:"
    pub fn new(db_path: &str) -> Result<Self, DBError> {
        let db_conn = Connection::open(db_path)?;
        db_conn.execute(
           "CREATE TABLE IF NOT EXISTS weather_records (
                id integer primary key autoincrement,
                location_name text not null,
                location_query text not null,
                latitude real not null,
                longitude real not null,
                start_date text not null,
                end_date text not null,
                weather_data text null,
                created_at text not null,
                updated_at text not null
           )",
           [],
        )?;

        Ok(DB { db_conn })
    }

    /// Inserts a record and returns it as stored
    ///
    /// # Arguments
    ///
    /// * 'record' - the record to insert
    /// * 'now' - creation time, used for both created_at and updated_at
    pub fn insert_record(&mut self, record: &NewRecord, now: DateTime<Utc>) -> Result<WeatherRecord, DBError> {
        let weather_data = serde_json::to_string(&record.weather_data)?;
        let now = timestamp(now);

        let tx = self.db_conn.transaction()?;
        tx.execute(
            "INSERT INTO weather_records
                (location_name, location_query, latitude, longitude, start_date, end_date, weather_data, created_at, updated_at)
                values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                record.location_name,
                record.location_query,
                record.latitude,
                record.longitude,
                record.start_date,
                record.end_date,
                weather_data,
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();
        let inserted = select_record(&tx, id)?
            .ok_or_else(|| DBError(format!("inserted record {} not readable", id)))?;
        tx.commit()?;

        Ok(inserted)
    }

    /// Returns all records, newest first
    ///
    pub fn list_records(&self) -> Result<Vec<WeatherRecord>, DBError> {
        let mut stmt = self.db_conn.prepare(
            &format!("{} ORDER BY created_at DESC, id DESC;", SELECT_RECORD),
        )?;
        let rows = stmt.query_map([], record_row)?;

        let mut result: Vec<WeatherRecord> = Vec::new();
        for row in rows {
            result.push(WeatherRecord::try_from(row?)?);
        }

        Ok(result)
    }

    /// Returns the record with the given id, if any
    ///
    /// # Arguments
    ///
    /// * 'id' - record id
    pub fn get_record(&self, id: i64) -> Result<Option<WeatherRecord>, DBError> {
        select_record(&self.db_conn, id)
    }

    /// Overwrites a record's fields and bumps its updated_at. Returns the record as stored,
    /// or `None` if no record has the given id.
    ///
    /// # Arguments
    ///
    /// * 'record' - record with new field values, created_at and updated_at are not written
    /// * 'now' - new updated_at
    pub fn update_record(&mut self, record: &WeatherRecord, now: DateTime<Utc>) -> Result<Option<WeatherRecord>, DBError> {
        let weather_data = record.weather_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let tx = self.db_conn.transaction()?;
        let changed = tx.execute(
            "UPDATE weather_records
                SET location_name = ?1, location_query = ?2, latitude = ?3, longitude = ?4,
                    start_date = ?5, end_date = ?6, weather_data = ?7, updated_at = ?8
                WHERE id = ?9",
            params![
                record.location_name,
                record.location_query,
                record.latitude,
                record.longitude,
                record.start_date,
                record.end_date,
                weather_data,
                timestamp(now),
                record.id,
            ],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        let updated = select_record(&tx, record.id)?;
        tx.commit()?;

        Ok(updated)
    }

    /// Deletes a record, returns false if there was no record with the given id
    ///
    /// # Arguments
    ///
    /// * 'id' - record id
    pub fn delete_record(&mut self, id: i64) -> Result<bool, DBError> {
        let tx = self.db_conn.transaction()?;
        let deleted = tx.execute("DELETE FROM weather_records WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(deleted > 0)
    }
}

impl TryFrom<RecordRow> for WeatherRecord {
    type Error = DBError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let weather_data = match row.weather_data {
            Some(json) if !json.is_empty() => Some(serde_json::from_str(&json)?),
            _ => None,
        };

        Ok(WeatherRecord {
            id: row.id,
            location_name: row.location_name,
            location_query: row.location_query,
            latitude: row.latitude,
            longitude: row.longitude,
            start_date: row.start_date,
            end_date: row.end_date,
            weather_data,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)?.with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&row.updated_at)?.with_timezone(&Utc),
        })
    }
}

fn select_record(conn: &Connection, id: i64) -> Result<Option<WeatherRecord>, DBError> {
    let row = conn
        .query_row(&format!("{} WHERE id = ?1;", SELECT_RECORD), params![id], record_row)
        .optional()?;

    row.map(WeatherRecord::try_from).transpose()
}

fn record_row(row: &Row) -> rusqlite::Result<RecordRow> {
    Ok(RecordRow {
        id: row.get(0)?,
        location_name: row.get(1)?,
        location_query: row.get(2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        weather_data: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn timestamp(date_time: DateTime<Utc>) -> String {
    date_time.to_rfc3339_opts(SecondsFormat::Micros, true)
}
