use super::DemandError;
use crate::model::region::ZoneId;
use chrono::NaiveDateTime;
use std::path::Path;
use uom::si::f64::{Length, Time};
use uom::si::length::kilometer;
use uom::si::time::second;

/// a pickup time jump beyond this between consecutive kept rows marks a
/// corrupted tail; the remainder of the file is dropped.
const MAX_ROW_GAP_S: i64 = 2 * 3600;

const TIMESTAMP_FORMATS: [&str; 2] = ["%m/%d/%Y %I:%M:%S %p", "%Y-%m-%d %H:%M:%S"];

/// one cleaned row of a trip log.
#[derive(Clone, Copy, Debug)]
pub struct TripRecord {
    pub pickup_time: NaiveDateTime,
    pub dropoff_time: NaiveDateTime,
    pub pickup_zone: ZoneId,
    pub dropoff_zone: ZoneId,
    pub distance: Length,
    pub fare: f64,
}

impl TripRecord {
    pub fn service_duration(&self) -> Time {
        Time::new::<second>((self.dropoff_time - self.pickup_time).num_seconds() as f64)
    }

    /// reads a time-sorted trip log. both the NYC TLC column names and the
    /// plain `pickup_time,...` names are accepted. malformed rows (blank
    /// primary key, unparsable fields, non-positive distance or fare,
    /// dropoff at or before pickup, passenger count below one) are skipped
    /// silently; returns the kept records and the skip count.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<(Vec<TripRecord>, usize), DemandError> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let headers = reader.headers()?.clone();
        let columns = Columns::resolve(&headers)?;

        let mut records: Vec<TripRecord> = vec![];
        let mut skipped = 0;
        for row in reader.records() {
            let row = row?;
            let record = match columns.parse(&row) {
                Some(r) => r,
                None => {
                    skipped += 1;
                    continue;
                }
            };
            if let Some(last) = records.last() {
                if (record.pickup_time - last.pickup_time).num_seconds() > MAX_ROW_GAP_S {
                    log::warn!(
                        "trip log jumps {} -> {}; treating the remainder as a corrupted tail",
                        last.pickup_time,
                        record.pickup_time
                    );
                    break;
                }
            }
            records.push(record);
        }
        if skipped > 0 {
            log::debug!("skipped {} malformed trip rows", skipped);
        }
        Ok((records, skipped))
    }
}

/// resolved column indices of a trip log, tolerant of the two header
/// dialects.
struct Columns {
    pickup_time: usize,
    dropoff_time: usize,
    pickup_zone: usize,
    dropoff_zone: usize,
    distance: usize,
    fare: usize,
    primary_key: Option<usize>,
    passenger_count: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Columns, DemandError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        };
        let required = |names: &[&str]| {
            find(names).ok_or_else(|| {
                DemandError::DatasetError(format!(
                    "trip log is missing a required column (one of {:?})",
                    names
                ))
            })
        };
        Ok(Columns {
            pickup_time: required(&["tpep_pickup_datetime", "pickup_time"])?,
            dropoff_time: required(&["tpep_dropoff_datetime", "dropoff_time"])?,
            pickup_zone: required(&["PULocationID", "pickup_location"])?,
            dropoff_zone: required(&["DOLocationID", "dropoff_location"])?,
            distance: required(&["trip_distance", "distance"])?,
            fare: required(&["fare_amount", "fare"])?,
            primary_key: find(&["VendorID", "id"]),
            passenger_count: find(&["passenger_count"]),
        })
    }

    /// parses and validates one row; `None` means the row is skipped.
    fn parse(&self, row: &csv::StringRecord) -> Option<TripRecord> {
        if let Some(key) = self.primary_key {
            if row.get(key)?.trim().is_empty() {
                return None;
            }
        }
        if let Some(count) = self.passenger_count {
            let passengers: i64 = row.get(count)?.trim().parse().ok()?;
            if passengers < 1 {
                return None;
            }
        }
        let pickup_time = parse_timestamp(row.get(self.pickup_time)?)?;
        let dropoff_time = parse_timestamp(row.get(self.dropoff_time)?)?;
        let pickup_zone: u64 = row.get(self.pickup_zone)?.trim().parse().ok()?;
        let dropoff_zone: u64 = row.get(self.dropoff_zone)?.trim().parse().ok()?;
        let distance: f64 = row.get(self.distance)?.trim().parse().ok()?;
        let fare: f64 = row.get(self.fare)?.trim().parse().ok()?;

        if distance <= 0.0 || fare <= 0.0 || dropoff_time <= pickup_time {
            return None;
        }
        Some(TripRecord {
            pickup_time,
            dropoff_time,
            pickup_zone: ZoneId(pickup_zone),
            dropoff_zone: ZoneId(dropoff_zone),
            distance: Length::new::<kilometer>(distance),
            fare,
        })
    }
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value.trim(), fmt).ok())
}
