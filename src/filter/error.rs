use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Field {field} does not exist on {entity}")]
    InvalidField { entity: String, field: String },

    #[error("Invalid value for field '{field}': expected {expected}")]
    InvalidValue { field: String, expected: &'static str },

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),
}
