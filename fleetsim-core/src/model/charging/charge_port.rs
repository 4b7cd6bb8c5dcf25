use crate::model::vehicle::VehicleId;
use serde::Serialize;
use uom::si::f64::Power;
use uom::si::power::kilowatt;
use uom::ConstZero;

/// one physical connector of a charging station.
///
/// `efficiency` is a reported attribute of the hardware; energy delivered
/// to the occupant's battery is `current_power * dt`, unscaled.
#[derive(Debug)]
pub struct ChargePort {
    p_max: Power,
    efficiency: f64,
    occupant: Option<VehicleId>,
    current_power: Power,
}

impl ChargePort {
    pub fn new(p_max: Power, efficiency: f64) -> ChargePort {
        ChargePort {
            p_max,
            efficiency,
            occupant: None,
            current_power: Power::ZERO,
        }
    }

    pub fn p_max(&self) -> Power {
        self.p_max
    }

    pub fn occupant(&self) -> Option<VehicleId> {
        self.occupant
    }

    pub fn current_power(&self) -> Power {
        self.current_power
    }

    /// connects a vehicle at its preferred rate, capped by the port.
    pub(super) fn attach(&mut self, vehicle: VehicleId, preferred_rate: Power) {
        self.occupant = Some(vehicle);
        self.current_power = preferred_rate.min(self.p_max);
    }

    /// updates the rate of the connected vehicle, capped by the port.
    pub(super) fn set_rate(&mut self, preferred_rate: Power) {
        self.current_power = preferred_rate.min(self.p_max);
    }

    /// caps the rate from above, used by the station power allocator.
    pub(super) fn limit_to(&mut self, ceiling: Power) {
        self.current_power = self.current_power.min(ceiling.max(Power::ZERO));
    }

    pub(super) fn release(&mut self) {
        self.occupant = None;
        self.current_power = Power::ZERO;
    }

    pub fn snapshot(&self) -> PortSnapshot {
        PortSnapshot {
            p_max_kw: self.p_max.get::<kilowatt>(),
            efficiency: self.efficiency,
            occupant: self.occupant,
            current_power_kw: self.current_power.get::<kilowatt>(),
        }
    }
}

/// serializable view of a [`ChargePort`].
#[derive(Clone, Debug, Serialize)]
pub struct PortSnapshot {
    pub p_max_kw: f64,
    pub efficiency: f64,
    pub occupant: Option<VehicleId>,
    pub current_power_kw: f64,
}
