#[derive(thiserror::Error, Debug)]
pub enum BatteryError {
    /// strict mode only: an energy draw exceeded the stored energy.
    /// `deficit` is the unmet portion in kWh.
    #[error("battery emptied with {deficit:.4} kWh of unmet draw")]
    Empty { deficit: f64 },
    /// strict mode only: an energy supply exceeded the remaining headroom.
    /// `surplus` is the rejected portion in kWh.
    #[error("battery saturated with {surplus:.4} kWh of rejected supply")]
    OverCharge { surplus: f64 },
    #[error("failure building battery model: {0}")]
    BuildError(String),
}
