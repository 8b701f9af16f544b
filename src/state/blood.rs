//! Shared blood record.
//!
//! Every organ reads and writes the same `Blood` during a tick. Each field
//! carries a hard physiological range; organs clamp what they write and the
//! orchestrator re-clamps after every organ update, so no organ can hand an
//! out-of-range record to the next one.

use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]` for a clamped physiological quantity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp a value into the range; NaN maps to `min`
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Hard bounds for every blood field
pub mod bounds {
    use super::Range;

    /// Arterial oxygen saturation (%)
    pub const OXYGEN_SATURATION_PCT: Range = Range::new(0.0, 100.0);
    /// Arterial CO2 partial pressure (mmHg)
    pub const CO2_PARTIAL_PRESSURE_MMHG: Range = Range::new(10.0, 150.0);
    /// Plasma glucose (mg/dL)
    pub const GLUCOSE_MG_PER_DL: Range = Range::new(20.0, 600.0);
    /// Angiotensin II (arbitrary units)
    pub const ANGIOTENSIN_AU: Range = Range::new(0.0, 50.0);
    /// Circulating toxin load (arbitrary units)
    pub const TOXINS_AU: Range = Range::new(0.0, 200.0);
    /// Systolic pressure (mmHg)
    pub const SYSTOLIC_MMHG: Range = Range::new(40.0, 250.0);
    /// Diastolic pressure (mmHg)
    pub const DIASTOLIC_MMHG: Range = Range::new(20.0, 150.0);
}

/// Arterial blood pressure (mmHg)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic_mmHg: f64,
    pub diastolic_mmHg: f64,
}

impl BloodPressure {
    /// Mean arterial pressure: diastolic + pulse pressure / 3
    pub fn mean_arterial_mmHg(&self) -> f64 {
        self.diastolic_mmHg + (self.systolic_mmHg - self.diastolic_mmHg) / 3.0
    }

    /// Pulse pressure (systolic − diastolic)
    pub fn pulse_pressure_mmHg(&self) -> f64 {
        self.systolic_mmHg - self.diastolic_mmHg
    }
}

impl Default for BloodPressure {
    fn default() -> Self {
        // Matches the heart's pressure output at 75 bpm with baseline angiotensin
        Self {
            systolic_mmHg: 110.0,
            diastolic_mmHg: 75.0,
        }
    }
}

/// Blood composition and pressure shared across all organs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blood {
    /// Arterial oxygen saturation (%)
    pub oxygen_saturation_pct: f64,
    /// Arterial CO2 partial pressure (mmHg)
    pub co2_partial_pressure_mmHg: f64,
    /// Plasma glucose (mg/dL)
    pub glucose_mg_per_dL: f64,
    /// Angiotensin II level (AU); drives vasoconstriction
    pub angiotensin_au: f64,
    /// Circulating toxin load (AU)
    pub toxins_au: f64,
    /// Arterial pressure
    pub blood_pressure: BloodPressure,
}

impl Default for Blood {
    fn default() -> Self {
        Self {
            oxygen_saturation_pct: 98.0,
            co2_partial_pressure_mmHg: 40.0,
            glucose_mg_per_dL: 90.0,
            angiotensin_au: 1.0,
            toxins_au: 0.0,
            blood_pressure: BloodPressure::default(),
        }
    }
}

impl Blood {
    /// Mean arterial pressure derived from systolic/diastolic
    pub fn mean_arterial_pressure_mmHg(&self) -> f64 {
        self.blood_pressure.mean_arterial_mmHg()
    }

    /// Force every field back inside its bounds.
    ///
    /// Diastolic pressure is additionally capped at systolic.
    pub fn clamp_to_bounds(&mut self) {
        self.oxygen_saturation_pct = bounds::OXYGEN_SATURATION_PCT.clamp(self.oxygen_saturation_pct);
        self.co2_partial_pressure_mmHg =
            bounds::CO2_PARTIAL_PRESSURE_MMHG.clamp(self.co2_partial_pressure_mmHg);
        self.glucose_mg_per_dL = bounds::GLUCOSE_MG_PER_DL.clamp(self.glucose_mg_per_dL);
        self.angiotensin_au = bounds::ANGIOTENSIN_AU.clamp(self.angiotensin_au);
        self.toxins_au = bounds::TOXINS_AU.clamp(self.toxins_au);

        let bp = &mut self.blood_pressure;
        bp.systolic_mmHg = bounds::SYSTOLIC_MMHG.clamp(bp.systolic_mmHg);
        bp.diastolic_mmHg = bounds::DIASTOLIC_MMHG
            .clamp(bp.diastolic_mmHg)
            .min(bp.systolic_mmHg);
    }

    /// Whether every field currently lies within its bounds
    pub fn is_within_bounds(&self) -> bool {
        bounds::OXYGEN_SATURATION_PCT.contains(self.oxygen_saturation_pct)
            && bounds::CO2_PARTIAL_PRESSURE_MMHG.contains(self.co2_partial_pressure_mmHg)
            && bounds::GLUCOSE_MG_PER_DL.contains(self.glucose_mg_per_dL)
            && bounds::ANGIOTENSIN_AU.contains(self.angiotensin_au)
            && bounds::TOXINS_AU.contains(self.toxins_au)
            && bounds::SYSTOLIC_MMHG.contains(self.blood_pressure.systolic_mmHg)
            && bounds::DIASTOLIC_MMHG.contains(self.blood_pressure.diastolic_mmHg)
            && self.blood_pressure.diastolic_mmHg <= self.blood_pressure.systolic_mmHg
    }
}
