use super::{BatteryError, BatteryModel};
use uom::si::energy::kilowatt_hour;
use uom::si::f64::{Energy, Ratio, Time};
use uom::si::ratio::ratio;
use uom::si::time::second;

/// fitted parameters of one degradation regime. the active regime is
/// selected from the capacity fade `f = actual / initial` before each
/// energy flow event, so a battery moves through the stages as it ages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DegradationStage {
    pub alpha: f64,
    pub beta: f64,
    pub psi: f64,
    pub zeta: f64,
}

const STAGE_ONE: DegradationStage = DegradationStage {
    alpha: 0.2172,
    beta: 24.2535,
    psi: -12.0051,
    zeta: 0.3952,
};
const STAGE_TWO: DegradationStage = DegradationStage {
    alpha: 0.2652,
    beta: 9.9653,
    psi: -29.0049,
    zeta: 0.4470,
};
const STAGE_THREE: DegradationStage = DegradationStage {
    alpha: 0.2611,
    beta: -15.1963,
    psi: -22.5247,
    zeta: 0.5066,
};

impl DegradationStage {
    /// picks the regime for a capacity fade value. boundaries at 0.933 and
    /// 0.866 belong to the older regime.
    pub fn select(fade: f64) -> &'static DegradationStage {
        if fade > 0.933 {
            &STAGE_ONE
        } else if fade > 0.866 {
            &STAGE_TWO
        } else {
            &STAGE_THREE
        }
    }
}

/// reference cycle count of the fitted model.
const N_CREF: f64 = 513.0;
/// reference temperature, raw degrees Celsius.
const T_REF: f64 = 25.0;
/// currents at or below this magnitude (kW) are treated as no flow.
const CURRENT_EPSILON: f64 = 1e-5;

/// multi-stage empirical degradation battery.
///
/// Every energy flow event updates the state of charge and removes a small
/// amount of usable capacity. Charge and discharge are symmetric: both
/// funnel into the same per-event stress computation with a signed energy
/// delta. The temperature factor is evaluated on raw Celsius values, not
/// Kelvin; this matches the fitted model and must not be "fixed" without
/// refitting, since published runs depend on it.
///
/// By default, events that would empty or saturate the battery are clamped
/// and the excess is absorbed silently. A battery built with
/// [`MultiStageBattery::strict`] instead reports the excess as
/// [`BatteryError::Empty`] or [`BatteryError::OverCharge`].
pub struct MultiStageBattery {
    initial_capacity_kwh: f64,
    actual_capacity_kwh: f64,
    soc: f64,
    strict: bool,
}

impl MultiStageBattery {
    /// a fresh battery at full state of charge and nominal capacity.
    pub fn new(capacity: Energy) -> MultiStageBattery {
        MultiStageBattery {
            initial_capacity_kwh: capacity.get::<kilowatt_hour>(),
            actual_capacity_kwh: capacity.get::<kilowatt_hour>(),
            soc: 1.0,
            strict: false,
        }
    }

    /// a fresh battery holding the given state of charge.
    pub fn with_soc(capacity: Energy, soc: f64) -> MultiStageBattery {
        MultiStageBattery {
            soc: soc.clamp(0.0, 1.0),
            ..MultiStageBattery::new(capacity)
        }
    }

    /// a fresh battery that errors on over-draw and over-supply instead of
    /// clamping.
    pub fn strict(capacity: Energy) -> MultiStageBattery {
        MultiStageBattery {
            strict: true,
            ..MultiStageBattery::new(capacity)
        }
    }

    /// the degradation regime that would govern the next event.
    pub fn stage(&self) -> &'static DegradationStage {
        DegradationStage::select(self.actual_capacity_kwh / self.initial_capacity_kwh)
    }

    /// applies one energy flow event of `delta_w_kwh` (signed, +in/-out)
    /// over `delta_t_s` at `ambient_celsius`, committing the new state of
    /// charge and the capacity loss.
    fn recalculate_capacity(
        &mut self,
        delta_w_kwh: f64,
        delta_t_s: f64,
        ambient_celsius: f64,
    ) -> Result<(), BatteryError> {
        let stage = self.stage();
        let stored_kwh = self.soc * self.actual_capacity_kwh;

        // target depth after the event, clamped to the physical range with
        // the effective energy delta adjusted to match
        let mut effective_kwh = delta_w_kwh;
        let mut depth = (stored_kwh + delta_w_kwh) / self.actual_capacity_kwh;
        if depth <= 0.0 {
            if self.strict && depth < 0.0 {
                return Err(BatteryError::Empty {
                    deficit: -(stored_kwh + delta_w_kwh),
                });
            }
            depth = 0.0;
            effective_kwh = -stored_kwh;
        } else if depth >= 1.0 {
            if self.strict && depth > 1.0 {
                return Err(BatteryError::OverCharge {
                    surplus: stored_kwh + delta_w_kwh - self.actual_capacity_kwh,
                });
            }
            depth = 1.0;
            effective_kwh = self.actual_capacity_kwh - stored_kwh;
        }

        let current_kw = effective_kwh / (delta_t_s / 3600.0);
        if current_kw.abs() <= CURRENT_EPSILON {
            return Ok(());
        }

        // per-event stress. the fractional exponents are applied to
        // magnitudes: the source evaluates negative bases in the complex
        // plane and takes the modulus, which is the same number.
        let i_ref_kw = 0.5 * self.initial_capacity_kwh;
        let stress = depth.abs().powf(1.0 / stage.alpha)
            * (current_kw.abs() / i_ref_kw).powf(1.0 / stage.beta)
            * (-stage.psi * (1.0 / ambient_celsius - 1.0 / T_REF)).exp();
        let q_loss = stress / N_CREF;
        assert!(q_loss >= 0.0, "negative capacity loss {}", q_loss);

        self.soc = depth;
        self.actual_capacity_kwh = (self.actual_capacity_kwh - q_loss).max(0.0);
        Ok(())
    }
}

impl BatteryModel for MultiStageBattery {
    fn charge(
        &mut self,
        energy: Energy,
        elapsed: Time,
        ambient_celsius: f64,
    ) -> Result<(), BatteryError> {
        self.recalculate_capacity(
            energy.get::<kilowatt_hour>(),
            elapsed.get::<second>(),
            ambient_celsius,
        )
    }

    fn discharge(
        &mut self,
        energy: Energy,
        elapsed: Time,
        ambient_celsius: f64,
    ) -> Result<(), BatteryError> {
        self.recalculate_capacity(
            -energy.get::<kilowatt_hour>(),
            elapsed.get::<second>(),
            ambient_celsius,
        )
    }

    fn age(&mut self, _elapsed: Time, _ambient_celsius: f64) {
        // TODO: calendar aging term; the fitted model only covers cycling
    }

    fn soc(&self) -> Ratio {
        Ratio::new::<ratio>(self.soc)
    }

    fn initial_capacity(&self) -> Energy {
        Energy::new::<kilowatt_hour>(self.initial_capacity_kwh)
    }

    fn actual_capacity(&self) -> Energy {
        Energy::new::<kilowatt_hour>(self.actual_capacity_kwh)
    }
}
