use super::{RegionError, ZoneId};
use uom::si::f64::{Length, Time};

/// capability interface over a city map. a region answers mean travel
/// queries between zones; everything else about the map stays behind this
/// trait so alternative map sources can be added without touching the
/// vehicle or simulator tick loops.
pub trait RegionModel: Send + Sync {
    /// mean `(distance, time)` of travelling from `origin` to
    /// `destination`. calling this with a zone that is not part of the
    /// region is a programmer error and surfaces as
    /// [`RegionError::ZoneNotFound`].
    fn distance(&self, origin: &ZoneId, destination: &ZoneId)
        -> Result<(Length, Time), RegionError>;

    /// all zone ids known to this region, in a stable order.
    fn zones(&self) -> Vec<ZoneId>;

    fn contains(&self, zone: &ZoneId) -> bool;
}
