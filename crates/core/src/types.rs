/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates carry no timezone; they are interpreted as UTC days.
pub type CalendarDate = chrono::NaiveDate;
