use super::BatteryError;
use uom::si::f64::{Energy, Ratio, Time};
use uom::si::ratio::ratio;

/// the state of health below which a battery is reported as retired.
pub const RETIREMENT_SOH: f64 = 0.8;

/// capability interface over a traction battery. implementations track the
/// instantaneous state of charge and the slow capacity fade caused by each
/// energy flow event; the tick loops never look past this trait.
///
/// ambient temperature is taken as a raw number in degrees Celsius because
/// the published degradation models are fit on raw Celsius values.
pub trait BatteryModel: Send + Sync {
    /// applies an energy inflow of `energy` over `elapsed`.
    fn charge(
        &mut self,
        energy: Energy,
        elapsed: Time,
        ambient_celsius: f64,
    ) -> Result<(), BatteryError>;

    /// applies an energy draw of `energy` over `elapsed`.
    fn discharge(
        &mut self,
        energy: Energy,
        elapsed: Time,
        ambient_celsius: f64,
    ) -> Result<(), BatteryError>;

    /// calendar aging over an interval with no energy flow.
    fn age(&mut self, elapsed: Time, ambient_celsius: f64);

    /// state of charge as a fraction of the current actual capacity.
    fn soc(&self) -> Ratio;

    fn initial_capacity(&self) -> Energy;

    fn actual_capacity(&self) -> Energy;

    /// state of health: actual capacity over initial capacity.
    fn soh(&self) -> Ratio {
        self.actual_capacity() / self.initial_capacity()
    }

    /// whether the battery has faded past its service life. retirement is
    /// reported, not enforced: a retired battery keeps operating.
    fn is_retired(&self) -> bool {
        self.soh().get::<ratio>() <= RETIREMENT_SOH
    }
}
