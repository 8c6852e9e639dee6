use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Please fill in the event {0}.")]
    MissingField(&'static str),

    /// Lower-cased names of the required columns that were not found.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Error reading file: {0}")]
    Attendance(String),

    #[error("Error loading image: {0}")]
    Image(String),

    #[error("{0}")]
    Ai(String),

    #[error("Error generating report: {0}")]
    Document(String),

    #[error("Invalid API Key: {0}")]
    Credential(String),

    #[error("Error loading styles: {0}")]
    Stylesheet(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_column() {
        let e = ReportError::MissingColumns(vec!["name".into(), "application_id".into()]);
        assert_eq!(e.to_string(), "Missing required columns: name, application_id");
    }
}
