use super::fleet_app_error::FleetAppError;
use fleetsim_core::model::vehicle::VehicleStatus;
use fleetsim_core::sim::StepInfo;
use std::fs::File;
use std::path::Path;

/// per-tick CSV stream of the quantities the analysis notebooks consume:
/// fleet profit, total charging energy drawn since the prior tick, the
/// cumulative completion counter, and per-vehicle state of health and
/// recovery flags.
pub struct RunLog {
    writer: csv::Writer<File>,
    prev_energy_kwh: Option<Vec<f64>>,
}

impl RunLog {
    pub fn create<P: AsRef<Path>>(path: P, fleet_size: usize) -> Result<RunLog, FleetAppError> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        let mut header: Vec<String> = vec![
            String::from("profit"),
            String::from("total_power"),
            String::from("completed"),
        ];
        header.extend((0..fleet_size).map(|i| format!("soh{}", i)));
        header.extend((0..fleet_size).map(|i| format!("recovery{}", i)));
        writer.write_record(&header)?;
        Ok(RunLog {
            writer,
            prev_energy_kwh: None,
        })
    }

    /// appends one row for the tick described by `info`.
    pub fn write(&mut self, info: &StepInfo) -> Result<(), FleetAppError> {
        // fares of rides underway on non-retired vehicles
        let profit: f64 = info
            .in_progress
            .iter()
            .filter(|job| {
                job.vehicle
                    .and_then(|vid| info.fleet.get(vid.0))
                    .map(|vehicle| !vehicle.retired)
                    .unwrap_or(false)
            })
            .map(|job| job.fare)
            .sum();

        // positive stored-energy deltas since the prior tick
        let energy: Vec<f64> = info
            .fleet
            .iter()
            .map(|v| v.soc * v.actual_capacity_kwh)
            .collect();
        let total_power: f64 = match &self.prev_energy_kwh {
            Some(prev) => energy
                .iter()
                .zip(prev.iter())
                .map(|(now, before)| (now - before).max(0.0))
                .sum(),
            None => 0.0,
        };

        let mut row: Vec<String> = vec![
            format!("{:.4}", profit),
            format!("{:.6}", total_power),
            info.completed.to_string(),
        ];
        row.extend(info.fleet.iter().map(|v| format!("{:.8}", v.soh)));
        row.extend(info.fleet.iter().map(|v| {
            if v.status == VehicleStatus::Recovery {
                String::from("1")
            } else {
                String::from("0")
            }
        }));
        self.writer.write_record(&row)?;
        self.writer.flush()?;
        self.prev_energy_kwh = Some(energy);
        Ok(())
    }
}
