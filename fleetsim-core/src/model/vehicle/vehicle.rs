use super::{ChargeRequest, VehicleError, VehicleId, VehicleModelConfig, VehicleStatus};
use crate::model::battery::{BatteryModel, BatteryModelConfig};
use crate::model::charging::StationId;
use crate::model::job::{Job, JobId};
use crate::model::region::{RegionModel, ZoneId};
use serde::Serialize;
use std::sync::Arc;
use uom::si::energy::kilowatt_hour;
use uom::si::f64::{Energy, Length, Power, Time};
use uom::si::length::kilometer;
use uom::si::power::kilowatt;
use uom::si::ratio::ratio;
use uom::si::time::second;
use uom::ConstZero;

/// how long a depleted vehicle is out of service.
const RECOVERY_DURATION_S: f64 = 24.0 * 3600.0;

/// an electric taxi.
///
/// The vehicle is a state machine driven by [`Vehicle::tick`] and by the
/// externally invoked commands [`Vehicle::service_demand`],
/// [`Vehicle::charge`] and [`Vehicle::relocate`]. It owns its battery and
/// reads travel distances from the shared region; jobs and stations are
/// referenced by id only and resolved through the simulator's tables, so
/// cross-subsystem effects of a tick are returned as values (a job
/// transition applied directly, a [`ChargeRequest`] routed by the caller)
/// rather than reaching into other subsystems.
///
/// While travelling, a tick either decrements the remaining travel time or,
/// when the timer has run out at tick start, consumes the leg's energy and
/// transitions. The energy of a leg is
/// `distance_km * efficiency / 100` kWh, with the distance read from the
/// region at transition time and the tick length (not the travel duration)
/// passed to the battery as the event interval.
pub struct Vehicle {
    vehicle_id: VehicleId,
    efficiency_kwh_per_100km: f64,
    battery: Box<dyn BatteryModel>,
    region: Arc<dyn RegionModel>,
    depot: ZoneId,
    location: ZoneId,
    destination: ZoneId,
    distance_remaining: Length,
    time_remaining: Time,
    status: VehicleStatus,
    assigned_job: Option<JobId>,
    assigned_charger: Option<StationId>,
    preferred_rate: Option<Power>,
}

impl Vehicle {
    /// builds a vehicle from its model and battery configuration, parked
    /// at `depot` with a fresh battery at full charge.
    pub fn new(
        vehicle_id: VehicleId,
        model: &VehicleModelConfig,
        battery_model: &BatteryModelConfig,
        depot: ZoneId,
        region: Arc<dyn RegionModel>,
    ) -> Result<Vehicle, VehicleError> {
        let (capacity, efficiency) = model.resolve()?;
        let battery = battery_model.build(capacity);
        Ok(Vehicle::with_battery(
            vehicle_id, efficiency, battery, depot, region,
        ))
    }

    /// builds a vehicle around an existing battery.
    pub fn with_battery(
        vehicle_id: VehicleId,
        efficiency_kwh_per_100km: f64,
        battery: Box<dyn BatteryModel>,
        depot: ZoneId,
        region: Arc<dyn RegionModel>,
    ) -> Vehicle {
        Vehicle {
            vehicle_id,
            efficiency_kwh_per_100km,
            battery,
            region,
            depot,
            location: depot,
            destination: depot,
            distance_remaining: Length::ZERO,
            time_remaining: Time::ZERO,
            status: VehicleStatus::Idle,
            assigned_job: None,
            assigned_charger: None,
            preferred_rate: None,
        }
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    pub fn location(&self) -> ZoneId {
        self.location
    }

    pub fn destination(&self) -> ZoneId {
        self.destination
    }

    pub fn depot(&self) -> ZoneId {
        self.depot
    }

    pub fn assigned_job(&self) -> Option<JobId> {
        self.assigned_job
    }

    pub fn assigned_charger(&self) -> Option<StationId> {
        self.assigned_charger
    }

    pub fn battery(&self) -> &dyn BatteryModel {
        self.battery.as_ref()
    }

    /// mutable battery access for the charging station's energy delivery.
    pub fn battery_mut(&mut self) -> &mut dyn BatteryModel {
        self.battery.as_mut()
    }

    /// dispatches the vehicle to a job's pickup zone. accepted while Idle,
    /// Charging or ToCharge; any held charger assignment is dropped and the
    /// released station id is returned so the caller can disconnect there.
    pub fn service_demand(&mut self, job: &mut Job) -> Result<Option<StationId>, VehicleError> {
        if !self.status.accepts_commands() {
            return Err(VehicleError::NotAvailable {
                vehicle_id: self.vehicle_id,
                command: "service_demand",
                status: self.status,
            });
        }
        let (distance, time) = self.region.distance(&self.location, &job.pickup())?;
        job.assign_vehicle(self.vehicle_id)?;

        let released = self.assigned_charger.take();
        self.preferred_rate = None;
        self.destination = job.pickup();
        self.distance_remaining = distance;
        self.time_remaining = time;
        self.assigned_job = Some(job.job_id());
        self.status = VehicleStatus::ToPickup;
        Ok(released)
    }

    /// sends the vehicle to a charging station with a preferred charge
    /// rate. a vehicle already Charging at that station stays connected and
    /// only updates its rate; otherwise it transitions to ToCharge and
    /// travels. returns a previously held, different station id so the
    /// caller can disconnect there.
    pub fn charge(
        &mut self,
        station: StationId,
        station_zone: ZoneId,
        preferred_rate: Power,
    ) -> Result<Option<StationId>, VehicleError> {
        if !self.status.accepts_commands() {
            return Err(VehicleError::NotAvailable {
                vehicle_id: self.vehicle_id,
                command: "charge",
                status: self.status,
            });
        }
        let (distance, time) = self.region.distance(&self.location, &station_zone)?;

        let released = match self.assigned_charger {
            Some(prior) if prior != station => Some(prior),
            _ => None,
        };
        let stay_connected =
            self.status == VehicleStatus::Charging && self.assigned_charger == Some(station);

        self.assigned_charger = Some(station);
        self.preferred_rate = Some(preferred_rate);
        self.destination = station_zone;
        self.distance_remaining = distance;
        self.time_remaining = time;
        if !stay_connected {
            self.status = VehicleStatus::ToCharge;
        }
        Ok(released)
    }

    /// repositions an idle vehicle to a zone without a job attached.
    pub fn relocate(&mut self, zone: ZoneId) -> Result<(), VehicleError> {
        if self.status != VehicleStatus::Idle {
            return Err(VehicleError::NotAvailable {
                vehicle_id: self.vehicle_id,
                command: "relocate",
                status: self.status,
            });
        }
        let (distance, time) = self.region.distance(&self.location, &zone)?;
        self.destination = zone;
        self.distance_remaining = distance;
        self.time_remaining = time;
        self.status = VehicleStatus::ToLoc;
        Ok(())
    }

    /// advances the vehicle by one tick of `dt` at the given ambient
    /// temperature. `job` must resolve the vehicle's assigned job id when
    /// the vehicle is servicing one.
    pub fn tick(
        &mut self,
        dt: Time,
        ambient_celsius: f64,
        job: Option<&mut Job>,
    ) -> Result<Option<ChargeRequest>, VehicleError> {
        match self.status {
            VehicleStatus::Idle => {
                self.battery.age(dt, ambient_celsius);
                Ok(None)
            }
            VehicleStatus::ToPickup => {
                if !self.arrived() {
                    self.time_remaining -= dt;
                    return Ok(None);
                }
                let job = job.ok_or(VehicleError::MissingJob(self.vehicle_id))?;
                self.travel_discharge(dt, ambient_celsius)?;
                self.location = self.destination;
                if self.depleted() {
                    job.fail()?;
                    self.assigned_job = None;
                    self.begin_recovery();
                } else {
                    let (distance, time) = self.region.distance(&self.location, &job.dropoff())?;
                    self.destination = job.dropoff();
                    self.distance_remaining = distance;
                    self.time_remaining = time;
                    job.inprogress()?;
                    self.status = VehicleStatus::OnJob;
                }
                Ok(None)
            }
            VehicleStatus::OnJob => {
                if !self.arrived() {
                    self.time_remaining -= dt;
                    return Ok(None);
                }
                let job = job.ok_or(VehicleError::MissingJob(self.vehicle_id))?;
                self.travel_discharge(dt, ambient_celsius)?;
                self.location = self.destination;
                if self.depleted() {
                    job.fail()?;
                    self.assigned_job = None;
                    self.begin_recovery();
                } else {
                    job.complete()?;
                    self.assigned_job = None;
                    self.status = VehicleStatus::Idle;
                }
                Ok(None)
            }
            VehicleStatus::ToCharge => {
                if !self.arrived() {
                    self.time_remaining -= dt;
                    return Ok(None);
                }
                self.travel_discharge(dt, ambient_celsius)?;
                self.location = self.destination;
                if self.depleted() {
                    self.begin_recovery();
                    return Ok(None);
                }
                self.status = VehicleStatus::Charging;
                Ok(Some(self.charge_request()?))
            }
            VehicleStatus::Charging => Ok(Some(self.charge_request()?)),
            VehicleStatus::ToLoc => {
                if !self.arrived() {
                    self.time_remaining -= dt;
                    return Ok(None);
                }
                self.travel_discharge(dt, ambient_celsius)?;
                self.location = self.destination;
                if self.depleted() {
                    self.begin_recovery();
                } else {
                    self.status = VehicleStatus::Idle;
                }
                Ok(None)
            }
            VehicleStatus::Recovery => {
                if self.arrived() {
                    self.location = self.depot;
                    self.status = VehicleStatus::Idle;
                } else {
                    self.time_remaining -= dt;
                }
                Ok(None)
            }
        }
    }

    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            vehicle_id: self.vehicle_id,
            status: self.status,
            location: self.location,
            destination: self.destination,
            distance_remaining_km: self.distance_remaining.get::<kilometer>(),
            time_remaining_s: self.time_remaining.get::<second>(),
            soc: self.battery.soc().get::<ratio>(),
            soh: self.battery.soh().get::<ratio>(),
            actual_capacity_kwh: self.battery.actual_capacity().get::<kilowatt_hour>(),
            retired: self.battery.is_retired(),
            assigned_job: self.assigned_job,
            assigned_charger: self.assigned_charger,
            preferred_rate_kw: self.preferred_rate.map(|r| r.get::<kilowatt>()),
        }
    }

    fn arrived(&self) -> bool {
        self.time_remaining <= Time::ZERO
    }

    fn depleted(&self) -> bool {
        self.battery.soc().get::<ratio>() <= 0.0
    }

    /// consumes the energy of the leg just completed. the distance is read
    /// from the region at transition time; the battery event interval is
    /// the tick length by model convention.
    fn travel_discharge(&mut self, dt: Time, ambient_celsius: f64) -> Result<(), VehicleError> {
        let (distance, _) = self.region.distance(&self.location, &self.destination)?;
        let energy = Energy::new::<kilowatt_hour>(
            distance.get::<kilometer>() * self.efficiency_kwh_per_100km / 100.0,
        );
        self.battery.discharge(energy, dt, ambient_celsius)?;
        Ok(())
    }

    fn charge_request(&self) -> Result<ChargeRequest, VehicleError> {
        let station = self
            .assigned_charger
            .ok_or(VehicleError::MissingCharger(self.vehicle_id))?;
        let rate = self
            .preferred_rate
            .ok_or(VehicleError::MissingCharger(self.vehicle_id))?;
        Ok(ChargeRequest { station, rate })
    }

    /// enters the recovery state: head for the depot, stay out of service
    /// for 24 simulated hours, and take on a full recharge as a single
    /// synthetic battery event.
    fn begin_recovery(&mut self) {
        log::debug!(
            "vehicle {} depleted at zone {}, entering recovery",
            self.vehicle_id,
            self.location
        );
        self.assigned_charger = None;
        self.preferred_rate = None;
        self.destination = self.depot;
        self.distance_remaining = Length::ZERO;
        self.time_remaining = Time::new::<second>(RECOVERY_DURATION_S);
        self.status = VehicleStatus::Recovery;
        let capacity = self.battery.actual_capacity();
        if let Err(e) = self
            .battery
            .charge(capacity, Time::new::<second>(3600.0), 25.0)
        {
            log::debug!("recovery recharge on vehicle {}: {}", self.vehicle_id, e);
        }
    }
}

/// serializable view of a [`Vehicle`] for `info` payloads and run logs.
#[derive(Clone, Debug, Serialize)]
pub struct VehicleSnapshot {
    pub vehicle_id: VehicleId,
    pub status: VehicleStatus,
    pub location: ZoneId,
    pub destination: ZoneId,
    pub distance_remaining_km: f64,
    pub time_remaining_s: f64,
    pub soc: f64,
    pub soh: f64,
    pub actual_capacity_kwh: f64,
    pub retired: bool,
    pub assigned_job: Option<JobId>,
    pub assigned_charger: Option<StationId>,
    pub preferred_rate_kw: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::battery::MultiStageBattery;
    use crate::model::job::{JobId, JobStatus};
    use crate::model::region::{OdSample, ZoneGraph};

    fn region() -> Arc<ZoneGraph> {
        let samples = [
            (1, 2, 3.0, 300.0),
            (2, 1, 3.0, 300.0),
            (2, 3, 5.0, 600.0),
            (3, 2, 5.0, 600.0),
            (3, 1, 8.0, 900.0),
            (1, 3, 8.0, 900.0),
        ]
        .map(|(o, d, km, s)| OdSample {
            origin: ZoneId(o),
            destination: ZoneId(d),
            distance_km: km,
            time_s: s,
        });
        Arc::new(ZoneGraph::from_samples(&samples).unwrap())
    }

    fn vehicle_at(depot: u64, capacity_kwh: f64, soc: f64) -> Vehicle {
        let battery = Box::new(MultiStageBattery::with_soc(
            Energy::new::<kilowatt_hour>(capacity_kwh),
            soc,
        ));
        Vehicle::with_battery(VehicleId(0), 17.1, battery, ZoneId(depot), region())
    }

    fn job(id: u64, pickup: u64, dropoff: u64) -> Job {
        Job::new(
            JobId(id),
            ZoneId(pickup),
            ZoneId(dropoff),
            Time::new::<second>(300.0),
            Length::new::<kilometer>(3.0),
            9.5,
        )
    }

    fn dt() -> Time {
        Time::new::<second>(300.0)
    }

    #[test]
    fn test_service_demand_through_completion() {
        let mut v = vehicle_at(1, 60.0, 1.0);
        let mut j = job(1, 1, 2);
        v.service_demand(&mut j).unwrap();
        assert_eq!(v.status(), VehicleStatus::ToPickup);
        assert_eq!(j.status(), JobStatus::Assigned);

        // pickup is the current zone, so the first tick boards the rider
        v.tick(dt(), 25.0, Some(&mut j)).unwrap();
        assert_eq!(v.status(), VehicleStatus::OnJob);
        assert_eq!(j.status(), JobStatus::InProgress);
        assert_eq!(v.destination(), ZoneId(2));

        // one tick of travel, then arrival
        v.tick(dt(), 25.0, Some(&mut j)).unwrap();
        assert_eq!(v.status(), VehicleStatus::OnJob);
        v.tick(dt(), 25.0, Some(&mut j)).unwrap();
        assert_eq!(v.status(), VehicleStatus::Idle);
        assert_eq!(v.location(), ZoneId(2));
        assert_eq!(j.status(), JobStatus::Complete);
        assert_eq!(v.assigned_job(), None);
        assert!(v.battery().soc().get::<ratio>() < 1.0);
    }

    #[test]
    fn test_travel_decrements_before_transition() {
        let mut v = vehicle_at(1, 60.0, 1.0);
        let mut j = job(1, 2, 3);
        v.service_demand(&mut j).unwrap();
        // time to pickup is 300 s: one decrementing tick, then the arrival
        v.tick(dt(), 25.0, Some(&mut j)).unwrap();
        assert_eq!(v.status(), VehicleStatus::ToPickup);
        assert_eq!(j.status(), JobStatus::Assigned);
        v.tick(dt(), 25.0, Some(&mut j)).unwrap();
        assert_eq!(v.status(), VehicleStatus::OnJob);
        assert_eq!(v.location(), ZoneId(2));
    }

    #[test]
    fn test_depletion_fails_job_and_recovers_at_depot() {
        // 0.01 soc on a 20 kWh pack cannot cover a 3 km leg
        let mut v = vehicle_at(1, 20.0, 0.01);
        let mut j = job(1, 1, 2);
        v.service_demand(&mut j).unwrap();
        v.tick(dt(), 25.0, Some(&mut j)).unwrap();
        assert_eq!(v.status(), VehicleStatus::OnJob);
        v.tick(dt(), 25.0, Some(&mut j)).unwrap();
        v.tick(dt(), 25.0, Some(&mut j)).unwrap();
        assert_eq!(v.status(), VehicleStatus::Recovery);
        assert_eq!(j.status(), JobStatus::Failed);
        assert_eq!(v.assigned_job(), None);
        // recovery recharges the pack in one synthetic event
        assert_eq!(v.battery().soc().get::<ratio>(), 1.0);

        // 24 simulated hours later the vehicle is idle at its depot
        let hour = Time::new::<second>(3600.0);
        for _ in 0..24 {
            v.tick(hour, 25.0, None).unwrap();
            assert_eq!(v.status(), VehicleStatus::Recovery);
        }
        v.tick(hour, 25.0, None).unwrap();
        assert_eq!(v.status(), VehicleStatus::Idle);
        assert_eq!(v.location(), ZoneId(1));
    }

    #[test]
    fn test_charge_command_travels_then_requests_power() {
        let mut v = vehicle_at(1, 60.0, 0.3);
        let rate = Power::new::<kilowatt>(50.0);
        v.charge(StationId(0), ZoneId(2), rate).unwrap();
        assert_eq!(v.status(), VehicleStatus::ToCharge);

        v.tick(dt(), 25.0, None).unwrap();
        let request = v.tick(dt(), 25.0, None).unwrap();
        assert_eq!(v.status(), VehicleStatus::Charging);
        assert_eq!(
            request,
            Some(ChargeRequest {
                station: StationId(0),
                rate
            })
        );
        // while charging, the request repeats every tick
        let request = v.tick(dt(), 25.0, None).unwrap();
        assert!(request.is_some());
    }

    #[test]
    fn test_charge_at_same_station_stays_connected() {
        let mut v = vehicle_at(2, 60.0, 0.3);
        let rate = Power::new::<kilowatt>(50.0);
        v.charge(StationId(0), ZoneId(2), rate).unwrap();
        v.tick(dt(), 25.0, None).unwrap();
        assert_eq!(v.status(), VehicleStatus::Charging);

        let released = v
            .charge(StationId(0), ZoneId(2), Power::new::<kilowatt>(20.0))
            .unwrap();
        assert_eq!(released, None);
        assert_eq!(v.status(), VehicleStatus::Charging);
    }

    #[test]
    fn test_charge_at_other_station_releases_prior() {
        let mut v = vehicle_at(2, 60.0, 0.3);
        v.charge(StationId(0), ZoneId(2), Power::new::<kilowatt>(50.0))
            .unwrap();
        v.tick(dt(), 25.0, None).unwrap();
        let released = v
            .charge(StationId(1), ZoneId(3), Power::new::<kilowatt>(50.0))
            .unwrap();
        assert_eq!(released, Some(StationId(0)));
        assert_eq!(v.status(), VehicleStatus::ToCharge);
        assert_eq!(v.destination(), ZoneId(3));
    }

    #[test]
    fn test_second_service_demand_overwrites_first() {
        let mut v = vehicle_at(1, 60.0, 1.0);
        let mut first = job(1, 2, 3);
        let mut second_job = job(2, 3, 1);
        v.service_demand(&mut first).unwrap();

        // ToPickup does not accept commands; put the vehicle back in a
        // commandable state the way the simulator would not - this mirrors
        // issuing two commands in the same tick through the job table
        v.status = VehicleStatus::Idle;
        v.service_demand(&mut second_job).unwrap();
        assert_eq!(v.assigned_job(), Some(JobId(2)));
        // the first job keeps its recorded vehicle and stays Assigned
        assert_eq!(first.status(), JobStatus::Assigned);
        assert_eq!(first.vehicle(), Some(VehicleId(0)));
    }

    #[test]
    fn test_relocate_only_from_idle() {
        let mut v = vehicle_at(1, 60.0, 1.0);
        v.relocate(ZoneId(2)).unwrap();
        assert_eq!(v.status(), VehicleStatus::ToLoc);
        assert!(v.relocate(ZoneId(3)).is_err());

        v.tick(dt(), 25.0, None).unwrap();
        v.tick(dt(), 25.0, None).unwrap();
        assert_eq!(v.status(), VehicleStatus::Idle);
        assert_eq!(v.location(), ZoneId(2));
    }

    #[test]
    fn test_service_demand_rejected_while_on_job() {
        let mut v = vehicle_at(1, 60.0, 1.0);
        let mut first = job(1, 1, 2);
        v.service_demand(&mut first).unwrap();
        v.tick(dt(), 25.0, Some(&mut first)).unwrap();
        assert_eq!(v.status(), VehicleStatus::OnJob);
        let mut second_job = job(2, 2, 3);
        assert!(matches!(
            v.service_demand(&mut second_job),
            Err(VehicleError::NotAvailable { .. })
        ));
    }
}
