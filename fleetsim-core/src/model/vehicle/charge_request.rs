use crate::model::charging::StationId;
use uom::si::f64::Power;

/// emitted by a vehicle tick when the vehicle wants power from its
/// assigned station. the simulator routes the request to the station's
/// waiting set; the station's own tick performs the energy injection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeRequest {
    pub station: StationId,
    pub rate: Power,
}
