use crate::model::battery::BatteryModel;
use crate::model::vehicle::Vehicle;
use ndarray::Array2;
use uom::si::ratio::ratio;

/// columns of the observation array: `(soh, soc)` per vehicle.
pub const OBSERVATION_WIDTH: usize = 2;

/// builds the `N x 2` observation of the fleet, row `i` holding vehicle
/// `i`'s capacity ratio and state of charge. both entries live in `[0, 1]`.
pub fn observe(fleet: &[Vehicle]) -> Array2<f64> {
    let mut observation = Array2::<f64>::zeros((fleet.len(), OBSERVATION_WIDTH));
    for (idx, vehicle) in fleet.iter().enumerate() {
        observation[[idx, 0]] = vehicle.battery().soh().get::<ratio>();
        observation[[idx, 1]] = vehicle.battery().soc().get::<ratio>();
    }
    observation
}
