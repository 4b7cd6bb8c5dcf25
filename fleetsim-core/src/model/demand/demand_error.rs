#[derive(thiserror::Error, Debug)]
pub enum DemandError {
    #[error("error with provided demand dataset: {0}")]
    DatasetError(String),
    #[error("failure reading demand data from file: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure reading demand data from CSV: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
}
