//! Vital-sign snapshot for display and logging.
//!
//! Aggregates the shared blood record and the headline readings of the
//! cardiopulmonary, neurological and urinary organs into one serializable
//! structure. Readings from absent organs are `None`.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::Blood;

/// Status indicator for a vital sign relative to its normal range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VitalStatus {
    /// Within the normal range
    #[default]
    Normal,
    /// Outside the normal range but within a 20% margin
    Warning,
    /// Beyond the margin
    Critical,
}

impl VitalStatus {
    /// Classify a value against its normal range
    pub fn from_value(value: f64, normal_min: f64, normal_max: f64) -> Self {
        let margin = (normal_max - normal_min) * 0.2;

        if value.is_nan() || value < normal_min - margin || value > normal_max + margin {
            VitalStatus::Critical
        } else if value < normal_min || value > normal_max {
            VitalStatus::Warning
        } else {
            VitalStatus::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VitalStatus::Normal => "OK",
            VitalStatus::Warning => "WARN",
            VitalStatus::Critical => "CRIT",
        }
    }
}

/// Normal adult reference ranges
pub mod normal_ranges {
    pub const OXYGEN_SATURATION_PCT: (f64, f64) = (95.0, 100.0);
    pub const CO2_PARTIAL_PRESSURE_MMHG: (f64, f64) = (35.0, 45.0);
    pub const GLUCOSE_MG_PER_DL: (f64, f64) = (70.0, 140.0);
    pub const MEAN_ARTERIAL_MMHG: (f64, f64) = (70.0, 105.0);
    pub const HEART_RATE_BPM: (f64, f64) = (60.0, 100.0);
    pub const RESPIRATION_RATE_PER_MIN: (f64, f64) = (12.0, 20.0);
    pub const GCS: (f64, f64) = (13.0, 15.0);
}

/// One classified reading
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalReading {
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub status: VitalStatus,
}

impl VitalReading {
    fn classify(name: &'static str, value: f64, unit: &'static str, range: (f64, f64)) -> Self {
        Self {
            name,
            value,
            unit,
            status: VitalStatus::from_value(value, range.0, range.1),
        }
    }
}

/// Point-in-time vital signs of a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    /// Simulated time since initialization (s)
    pub elapsed_sec: f64,
    /// Blood composition and pressure
    pub blood: Blood,
    /// Measured heart rate from R-R interval (bpm)
    pub heart_rate_bpm: Option<f64>,
    /// Current aortic pressure (mmHg)
    pub aortic_pressure_mmHg: Option<f64>,
    /// Respiration rate (breaths/min)
    pub respiration_rate_per_min: Option<f64>,
    /// Glasgow Coma Scale total (3-15)
    pub gcs_total: Option<u8>,
    /// Bladder volume (mL)
    pub bladder_volume_mL: Option<f64>,
}

impl VitalSigns {
    /// Classify every available reading against its normal range
    pub fn readings(&self) -> Vec<VitalReading> {
        use normal_ranges as n;

        let mut readings = vec![
            VitalReading::classify(
                "SpO2",
                self.blood.oxygen_saturation_pct,
                "%",
                n::OXYGEN_SATURATION_PCT,
            ),
            VitalReading::classify(
                "PaCO2",
                self.blood.co2_partial_pressure_mmHg,
                "mmHg",
                n::CO2_PARTIAL_PRESSURE_MMHG,
            ),
            VitalReading::classify(
                "Glucose",
                self.blood.glucose_mg_per_dL,
                "mg/dL",
                n::GLUCOSE_MG_PER_DL,
            ),
            VitalReading::classify(
                "MAP",
                self.blood.mean_arterial_pressure_mmHg(),
                "mmHg",
                n::MEAN_ARTERIAL_MMHG,
            ),
        ];
        if let Some(hr) = self.heart_rate_bpm {
            readings.push(VitalReading::classify("Heart Rate", hr, "bpm", n::HEART_RATE_BPM));
        }
        if let Some(rr) = self.respiration_rate_per_min {
            readings.push(VitalReading::classify(
                "Respiration",
                rr,
                "/min",
                n::RESPIRATION_RATE_PER_MIN,
            ));
        }
        if let Some(gcs) = self.gcs_total {
            readings.push(VitalReading::classify("GCS", gcs as f64, "", n::GCS));
        }
        readings
    }

    /// Worst status among all readings
    pub fn overall_status(&self) -> VitalStatus {
        self.readings()
            .iter()
            .map(|r| r.status)
            .max_by_key(|status| match status {
                VitalStatus::Normal => 0,
                VitalStatus::Warning => 1,
                VitalStatus::Critical => 2,
            })
            .unwrap_or_default()
    }

    /// Multi-line human-readable rendering
    pub fn render(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "Elapsed: {:.1} s", self.elapsed_sec);
        let bp = &self.blood.blood_pressure;
        let _ = writeln!(
            s,
            "Blood Pressure: {:.0}/{:.0} mmHg",
            bp.systolic_mmHg, bp.diastolic_mmHg
        );
        for reading in self.readings() {
            let _ = writeln!(
                s,
                "[{:>4}] {}: {:.1} {}",
                reading.status.as_str(),
                reading.name,
                reading.value,
                reading.unit
            );
        }
        if let Some(aortic) = self.aortic_pressure_mmHg {
            let _ = writeln!(s, "Aortic Pressure: {:.1} mmHg", aortic);
        }
        let _ = writeln!(s, "Toxins: {:.2} AU", self.blood.toxins_au);
        let _ = writeln!(s, "Angiotensin: {:.2} AU", self.blood.angiotensin_au);
        if let Some(volume) = self.bladder_volume_mL {
            let _ = writeln!(s, "Bladder Volume: {:.1} mL", volume);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> VitalSigns {
        VitalSigns {
            elapsed_sec: 0.0,
            blood: Blood::default(),
            heart_rate_bpm: Some(75.0),
            aortic_pressure_mmHg: Some(120.0),
            respiration_rate_per_min: Some(16.0),
            gcs_total: Some(15),
            bladder_volume_mL: Some(50.0),
        }
    }

    #[test]
    fn test_status_from_value() {
        assert_eq!(VitalStatus::from_value(98.0, 95.0, 100.0), VitalStatus::Normal);
        assert_eq!(VitalStatus::from_value(94.5, 95.0, 100.0), VitalStatus::Warning);
        assert_eq!(VitalStatus::from_value(90.0, 95.0, 100.0), VitalStatus::Critical);
        assert_eq!(VitalStatus::from_value(f64::NAN, 95.0, 100.0), VitalStatus::Critical);
    }

    #[test]
    fn test_baseline_snapshot_is_normal() {
        let vitals = snapshot();
        assert_eq!(vitals.overall_status(), VitalStatus::Normal);
        assert_eq!(vitals.readings().len(), 7);
    }

    #[test]
    fn test_missing_organs_drop_readings() {
        let vitals = VitalSigns {
            heart_rate_bpm: None,
            gcs_total: None,
            ..snapshot()
        };
        assert_eq!(vitals.readings().len(), 5);
        assert!(!vitals.render().contains("Heart Rate"));
    }

    #[test]
    fn test_hypoxia_is_critical() {
        let mut vitals = snapshot();
        vitals.blood.oxygen_saturation_pct = 80.0;
        assert_eq!(vitals.overall_status(), VitalStatus::Critical);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        assert!(json.contains("\"gcs_total\":15"));
    }
}
