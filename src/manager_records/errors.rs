use std::fmt;
use crate::manager_db::errors::DBError;
use crate::validation::DateError;

#[derive(Debug)]
pub enum RecordError {
    Validation(String),
    NotFound(String),
    Upstream(String),
    Persistence(DBError),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordError::Validation(e) => write!(f, "RecordError::Validation: {}", e),
            RecordError::NotFound(e) => write!(f, "RecordError::NotFound: {}", e),
            RecordError::Upstream(e) => write!(f, "RecordError::Upstream: {}", e),
            RecordError::Persistence(e) => write!(f, "RecordError::Persistence: {}", e),
        }
    }
}
impl From<DateError> for RecordError {
    fn from(e: DateError) -> Self {
        RecordError::Validation(e.to_string())
    }
}
impl From<DBError> for RecordError {
    fn from(e: DBError) -> Self {
        RecordError::Persistence(e)
    }
}
