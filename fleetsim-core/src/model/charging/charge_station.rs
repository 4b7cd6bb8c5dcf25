use super::{ChargePort, ChargingError, PortSnapshot, StationId};
use crate::model::battery::BatteryModel;
use crate::model::region::ZoneId;
use crate::model::vehicle::{Vehicle, VehicleId};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use uom::si::f64::{Energy, Power, Time};
use uom::si::power::kilowatt;
use uom::ConstZero;

/// a charging site with a fixed set of ports and an optional site-wide
/// power ceiling.
///
/// Vehicles that request power while all ports are taken sit in the
/// waiting set; the set is keyed by vehicle id in arrival order so the
/// per-tick port assignment is deterministic. The per-tick allocation runs
/// in three phases: free ports take waiting vehicles, the station ceiling
/// is enforced first-fit in port index order, then each occupied port
/// injects `current_power * dt` into its occupant's battery.
pub struct ChargeStation {
    station_id: StationId,
    location: ZoneId,
    ports: Vec<ChargePort>,
    p_max_station: Option<Power>,
    waiting: IndexMap<VehicleId, Power>,
}

impl ChargeStation {
    pub fn new(
        station_id: StationId,
        location: ZoneId,
        ports: Vec<ChargePort>,
        p_max_station: Option<Power>,
    ) -> ChargeStation {
        ChargeStation {
            station_id,
            location,
            ports,
            p_max_station,
            waiting: IndexMap::new(),
        }
    }

    pub fn station_id(&self) -> StationId {
        self.station_id
    }

    pub fn location(&self) -> ZoneId {
        self.location
    }

    pub fn ports(&self) -> &[ChargePort] {
        &self.ports
    }

    /// registers a vehicle's desired charge rate. a vehicle already on a
    /// port has its rate updated in place; anyone else lands in the
    /// waiting set, overwriting any earlier request. calling this twice
    /// with the same arguments is equivalent to calling it once.
    pub fn request_charge(&mut self, preferred_rate: Power, vehicle: VehicleId) {
        if let Some(port) = self
            .ports
            .iter_mut()
            .find(|p| p.occupant() == Some(vehicle))
        {
            port.set_rate(preferred_rate);
        } else {
            self.waiting.insert(vehicle, preferred_rate);
        }
    }

    /// frees any port held by the vehicle and drops it from the waiting
    /// set. idempotent.
    pub fn disconnect(&mut self, vehicle: VehicleId) {
        for port in self.ports.iter_mut() {
            if port.occupant() == Some(vehicle) {
                port.release();
            }
        }
        self.waiting.shift_remove(&vehicle);
    }

    /// one allocation round: assign waiting vehicles to free ports, apply
    /// the station power ceiling, deliver energy to occupants.
    pub fn tick(
        &mut self,
        fleet: &mut [Vehicle],
        dt: Time,
        ambient_celsius: f64,
    ) -> Result<(), ChargingError> {
        for port in self.ports.iter_mut() {
            if port.occupant().is_some() {
                continue;
            }
            match self.waiting.shift_remove_index(0) {
                Some((vehicle, preferred_rate)) => port.attach(vehicle, preferred_rate),
                None => break,
            }
        }

        if let Some(ceiling) = self.p_max_station {
            let mut used = Power::ZERO;
            for port in self.ports.iter_mut() {
                if port.occupant().is_none() {
                    continue;
                }
                if used + port.current_power() > ceiling {
                    port.limit_to(ceiling - used);
                }
                used += port.current_power();
            }
        }

        for port in self.ports.iter() {
            if let Some(vehicle_id) = port.occupant() {
                let vehicle =
                    fleet
                        .get_mut(vehicle_id.0)
                        .ok_or(ChargingError::UnknownVehicle {
                            station: self.station_id,
                            vehicle: vehicle_id,
                        })?;
                let energy: Energy = port.current_power() * dt;
                vehicle
                    .battery_mut()
                    .charge(energy, dt, ambient_celsius)?;
            }
        }
        Ok(())
    }

    /// sum of the power currently flowing across all ports.
    pub fn total_power(&self) -> Power {
        self.ports
            .iter()
            .fold(Power::ZERO, |acc, p| acc + p.current_power())
    }

    pub fn snapshot(&self) -> StationSnapshot {
        StationSnapshot {
            station_id: self.station_id,
            location: self.location,
            ports: self.ports.iter().map(|p| p.snapshot()).collect_vec(),
            waiting: self.waiting.keys().copied().collect_vec(),
            total_power_kw: self.total_power().get::<kilowatt>(),
        }
    }
}

/// serializable view of a [`ChargeStation`].
#[derive(Clone, Debug, Serialize)]
pub struct StationSnapshot {
    pub station_id: StationId,
    pub location: ZoneId,
    pub ports: Vec<PortSnapshot>,
    pub waiting: Vec<VehicleId>,
    pub total_power_kw: f64,
}
