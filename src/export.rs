use std::fmt;
use std::str::FromStr;
use crate::manager_db::models::WeatherRecord;

const CSV_HEADER: [&str; 12] = [
    "Record ID", "Location", "Latitude", "Longitude",
    "Start Date", "End Date", "Date", "Temperature",
    "Min Temp", "Max Temp", "Humidity", "Description",
];

#[derive(Debug)]
pub enum ExportError {
    UnsupportedFormat(String),
    Csv(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExportError::UnsupportedFormat(e) => write!(f, "ExportError::UnsupportedFormat: {}", e),
            ExportError::Csv(e) => write!(f, "ExportError::Csv: {}", e),
        }
    }
}
impl From<csv::Error> for ExportError {
    fn from(e: csv::Error) -> Self { ExportError::Csv(e.to_string()) }
}
impl From<csv::IntoInnerError<csv::Writer<Vec<u8>>>> for ExportError {
    fn from(e: csv::IntoInnerError<csv::Writer<Vec<u8>>>) -> Self { ExportError::Csv(e.to_string()) }
}
impl From<std::string::FromUtf8Error> for ExportError {
    fn from(e: std::string::FromUtf8Error) -> Self { ExportError::Csv(e.to_string()) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Flattens a record into one csv row per weather entry, each row repeating the record's
/// identifying fields. A record without weather entries gives the header only.
///
/// # Arguments
///
/// * 'record' - the record to export
pub fn to_csv(record: &WeatherRecord) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for day in record.weather_data.iter().flatten() {
        writer.write_record([
            record.id.to_string(),
            record.location_name.clone(),
            record.latitude.to_string(),
            record.longitude.to_string(),
            record.start_date.clone(),
            record.end_date.clone(),
            day.date.clone(),
            day.temp.to_string(),
            day.temp_min.to_string(),
            day.temp_max.to_string(),
            day.humidity.to_string(),
            day.description.clone(),
        ])?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

/// File name offered to the client for a csv export
pub fn csv_file_name(id: i64) -> String {
    format!("weather_{}.csv", id)
}
