use super::ZoneId;

#[derive(thiserror::Error, Debug)]
pub enum RegionError {
    #[error("zone not found in region: {0}")]
    ZoneNotFound(ZoneId),
    #[error("error with provided region dataset: {0}")]
    DatasetError(String),
    #[error("failure reading region data from file: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
    #[error("failure reading region data from CSV: {source}")]
    CsvError {
        #[from]
        source: csv::Error,
    },
}
