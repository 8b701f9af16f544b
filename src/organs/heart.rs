//! Heart: cardiac cycle, valve mechanics, EKG synthesis and arterial pressure.
//!
//! The cycle is driven by position-in-cycle with period 60/HR:
//!
//! | Fraction      | Phase                 |
//! |---------------|-----------------------|
//! | [0.00, 0.15)  | Atrial systole        |
//! | [0.15, 0.20)  | Diastole              |
//! | [0.20, 0.50)  | Ventricular systole   |
//! | [0.50, 1.00)  | Diastole              |
//!
//! Valves open whenever the pressure differential across them favors
//! forward flow. Ventricular volume integrates valve-gated flow.
//!
//! Vasoconstriction from blood angiotensin scales both the diastolic floor of
//! aortic pressure and the systemic blood pressure written into [`Blood`].

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write;

use super::{Organ, OrganId, OrganKind};
use crate::dynamics::{gaussian_bump, MeanReversion, NoiseSource};
use crate::error::{Result, SimError};
use crate::state::{Blood, WaveformBuffer, DEFAULT_WAVEFORM_CAPACITY};

/// Standard 12-lead names, in lead-index order
pub const EKG_LEAD_NAMES: [&str; 12] = [
    "I", "II", "III", "aVR", "aVL", "aVF", "V1", "V2", "V3", "V4", "V5", "V6",
];

/// Maximum number of EKG leads
pub const MAX_EKG_LEADS: usize = EKG_LEAD_NAMES.len();

/// Accepted intrinsic heart rate range (bpm)
pub const HEART_RATE_RANGE_BPM: (f64, f64) = (30.0, 220.0);

/// R-peak position as a fraction of the cycle
const R_PEAK_FRACTION: f64 = 0.22;

/// Flow through an open valve (mL/s)
const VALVE_FLOW_ML_PER_SEC: f64 = 500.0;

/// Ventricular volume bounds (mL)
const VENTRICLE_VOLUME_RANGE_ML: (f64, f64) = (40.0, 130.0);

const PULMONARY_ARTERY_PRESSURE_MMHG: f64 = 20.0;

/// Vasoconstriction gain per AU of angiotensin above baseline
const ANGIOTENSIN_GAIN: f64 = 0.05;

const INTRINSIC_RATE: MeanReversion =
    MeanReversion::new(0.5, 0.01, HEART_RATE_RANGE_BPM.0, HEART_RATE_RANGE_BPM.1);

/// One P/Q/R/S/T deflection: (cycle fraction, amplitude mV, width)
const EKG_WAVES: [(f64, f64, f64); 5] = [
    (0.10, 0.15, 0.04),  // P
    (0.20, -0.10, 0.02), // Q
    (0.22, 1.00, 0.02),  // R
    (0.24, -0.25, 0.02), // S
    (0.40, 0.30, 0.06),  // T
];

/// Phase of the cardiac cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardiacPhase {
    AtrialSystole,
    VentricularSystole,
    Diastole,
}

impl CardiacPhase {
    /// Phase for a fractional position in [0, 1)
    pub fn from_fraction(fraction: f64) -> Self {
        if (0.0..0.15).contains(&fraction) {
            CardiacPhase::AtrialSystole
        } else if (0.20..0.5).contains(&fraction) {
            CardiacPhase::VentricularSystole
        } else {
            CardiacPhase::Diastole
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CardiacPhase::AtrialSystole => "Atrial Systole",
            CardiacPhase::VentricularSystole => "Ventricular Systole",
            CardiacPhase::Diastole => "Diastole",
        }
    }
}

/// Contraction state of one chamber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChamberState {
    Systole,
    Diastole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chamber {
    pub name: &'static str,
    pub state: ChamberState,
    pub volume_mL: f64,
    pub pressure_mmHg: f64,
}

impl Chamber {
    fn new(name: &'static str, volume_mL: f64, pressure_mmHg: f64) -> Self {
        Self {
            name,
            state: ChamberState::Diastole,
            volume_mL,
            pressure_mmHg,
        }
    }
}

/// The four heart valves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Valve {
    Mitral,
    Tricuspid,
    Aortic,
    Pulmonary,
}

impl Valve {
    pub const ALL: [Valve; 4] = [Valve::Mitral, Valve::Tricuspid, Valve::Aortic, Valve::Pulmonary];

    pub fn name(self) -> &'static str {
        match self {
            Valve::Mitral => "Mitral Valve",
            Valve::Tricuspid => "Tricuspid Valve",
            Valve::Aortic => "Aortic Valve",
            Valve::Pulmonary => "Pulmonary Valve",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValveState {
    Open,
    Closed,
}

impl ValveState {
    fn from_gradient(upstream_mmHg: f64, downstream_mmHg: f64) -> Self {
        if upstream_mmHg > downstream_mmHg {
            ValveState::Open
        } else {
            ValveState::Closed
        }
    }

    pub fn is_open(self) -> bool {
        self == ValveState::Open
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValveState::Open => "OPEN",
            ValveState::Closed => "CLOSED",
        }
    }
}

/// Valve states indexed by [`Valve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValveSet {
    mitral: ValveState,
    tricuspid: ValveState,
    aortic: ValveState,
    pulmonary: ValveState,
}

impl ValveSet {
    fn get(&self, valve: Valve) -> ValveState {
        match valve {
            Valve::Mitral => self.mitral,
            Valve::Tricuspid => self.tricuspid,
            Valve::Aortic => self.aortic,
            Valve::Pulmonary => self.pulmonary,
        }
    }
}

/// Synthesized single-lead EKG voltage at a cycle fraction (mV)
pub fn ekg_voltage(fraction: f64) -> f64 {
    EKG_WAVES
        .iter()
        .map(|&(mu, amplitude, sigma)| amplitude * gaussian_bump(fraction, mu, sigma))
        .sum()
}

#[derive(Debug, Clone)]
pub struct Heart {
    id: OrganId,

    /// Intrinsic rate driving the cycle (bpm)
    heart_rate_bpm: f64,
    /// Set-point the intrinsic rate reverts to (bpm)
    rate_setpoint_bpm: f64,
    /// Rate estimated from the last R-R interval (bpm)
    measured_heart_rate_bpm: f64,

    total_time_sec: f64,
    cycle_position_sec: f64,
    last_r_peak_sec: Option<f64>,
    phase: CardiacPhase,

    left_atrium: Chamber,
    right_atrium: Chamber,
    left_ventricle: Chamber,
    right_ventricle: Chamber,
    valves: ValveSet,

    aortic_pressure_mmHg: f64,
    end_diastolic_volume_mL: f64,
    end_systolic_volume_mL: f64,
    ejection_fraction: f64,

    ekg_leads: Vec<(&'static str, WaveformBuffer)>,
}

impl Heart {
    /// Heart with the full 12-lead EKG
    pub fn new(id: OrganId) -> Self {
        Self::build(id, MAX_EKG_LEADS, DEFAULT_WAVEFORM_CAPACITY)
    }

    /// Heart with `lead_count` EKG leads (1-12)
    pub fn with_leads(id: OrganId, lead_count: usize, waveform_capacity: usize) -> Result<Self> {
        if lead_count == 0 || lead_count > MAX_EKG_LEADS {
            return Err(SimError::invalid(
                "lead_count",
                lead_count as f64,
                "must be between 1 and 12",
            ));
        }
        Ok(Self::build(id, lead_count, waveform_capacity))
    }

    fn build(id: OrganId, lead_count: usize, waveform_capacity: usize) -> Self {
        let ekg_leads = EKG_LEAD_NAMES
            .iter()
            .take(lead_count)
            .map(|&name| (name, WaveformBuffer::new(waveform_capacity)))
            .collect();

        Self {
            id,
            heart_rate_bpm: 75.0,
            rate_setpoint_bpm: 75.0,
            measured_heart_rate_bpm: 75.0,
            total_time_sec: 0.0,
            cycle_position_sec: 0.0,
            last_r_peak_sec: None,
            phase: CardiacPhase::AtrialSystole,
            left_atrium: Chamber::new("Left Atrium", 50.0, 5.0),
            right_atrium: Chamber::new("Right Atrium", 50.0, 2.0),
            left_ventricle: Chamber::new("Left Ventricle", 120.0, 5.0),
            right_ventricle: Chamber::new("Right Ventricle", 120.0, 2.0),
            valves: ValveSet {
                mitral: ValveState::Closed,
                tricuspid: ValveState::Closed,
                aortic: ValveState::Closed,
                pulmonary: ValveState::Closed,
            },
            aortic_pressure_mmHg: 120.0,
            end_diastolic_volume_mL: 120.0,
            end_systolic_volume_mL: 54.0,
            ejection_fraction: 0.55,
            ekg_leads,
        }
    }

    pub fn update(&mut self, blood: &mut Blood, noise: &mut NoiseSource, dt_sec: f64) {
        let dt = dt_sec.max(0.0);

        // --- Electrical ---
        self.total_time_sec += dt;
        self.heart_rate_bpm =
            INTRINSIC_RATE.step(self.heart_rate_bpm, self.rate_setpoint_bpm, dt, noise);
        let cycle_sec = 60.0 / self.heart_rate_bpm;

        let previous_position = self.cycle_position_sec;
        let end_position = previous_position + dt;
        self.detect_r_peaks(previous_position, end_position, cycle_sec);
        self.cycle_position_sec = end_position.rem_euclid(cycle_sec);

        let fraction = self.cycle_position_sec / cycle_sec;
        let voltage = ekg_voltage(fraction);
        for (index, (_, trace)) in self.ekg_leads.iter_mut().enumerate() {
            trace.push(voltage * lead_gain(index));
        }

        // --- Mechanical ---
        self.advance_phase(CardiacPhase::from_fraction(fraction));
        self.update_chamber_pressures(fraction);

        let vasoconstriction = vasoconstriction_factor(blood.angiotensin_au);
        let previous_aortic = self.aortic_pressure_mmHg;
        self.valves = ValveSet {
            mitral: ValveState::from_gradient(
                self.left_atrium.pressure_mmHg,
                self.left_ventricle.pressure_mmHg,
            ),
            tricuspid: ValveState::from_gradient(
                self.right_atrium.pressure_mmHg,
                self.right_ventricle.pressure_mmHg,
            ),
            aortic: ValveState::from_gradient(self.left_ventricle.pressure_mmHg, previous_aortic),
            pulmonary: ValveState::from_gradient(
                self.right_ventricle.pressure_mmHg,
                PULMONARY_ARTERY_PRESSURE_MMHG,
            ),
        };

        let flow = VALVE_FLOW_ML_PER_SEC * dt;
        let (lo, hi) = VENTRICLE_VOLUME_RANGE_ML;
        let lv = &mut self.left_ventricle;
        if self.valves.mitral.is_open() {
            lv.volume_mL += flow;
        }
        if self.valves.aortic.is_open() {
            lv.volume_mL -= flow;
        }
        lv.volume_mL = lv.volume_mL.clamp(lo, hi);
        let rv = &mut self.right_ventricle;
        if self.valves.tricuspid.is_open() {
            rv.volume_mL += flow;
        }
        if self.valves.pulmonary.is_open() {
            rv.volume_mL -= flow;
        }
        rv.volume_mL = rv.volume_mL.clamp(lo, hi);

        self.aortic_pressure_mmHg = if self.valves.aortic.is_open() {
            self.left_ventricle.pressure_mmHg
        } else {
            80.0 * vasoconstriction + 40.0 * (-self.cycle_position_sec).exp()
        };

        // --- Systemic pressure ---
        let rate_offset = self.heart_rate_bpm - 75.0;
        let bp = &mut blood.blood_pressure;
        bp.systolic_mmHg = ((110.0 + rate_offset * 0.5) * vasoconstriction).clamp(80.0, 180.0);
        bp.diastolic_mmHg = ((75.0 + rate_offset * 0.25) * vasoconstriction).clamp(50.0, 110.0);
    }

    /// Count the R-peaks at `r + k·cycle` falling in `(start, end]` of the
    /// cycle clock and update the measured rate from their exact times.
    ///
    /// A tick may span several beats; every peak it covers is counted.
    fn detect_r_peaks(&mut self, start_sec: f64, end_sec: f64, cycle_sec: f64) {
        let r_peak_sec = R_PEAK_FRACTION * cycle_sec;
        let first = ((start_sec - r_peak_sec) / cycle_sec).floor();
        let last = ((end_sec - r_peak_sec) / cycle_sec).floor();
        let count = last - first;
        if count < 1.0 {
            return;
        }

        // Absolute time of the newest peak inside this tick
        let tick_start_sec = self.total_time_sec - (end_sec - start_sec);
        let newest_peak_sec = tick_start_sec + (r_peak_sec + last * cycle_sec - start_sec);

        let interval = if count >= 2.0 {
            Some(cycle_sec)
        } else {
            self.last_r_peak_sec.map(|previous| newest_peak_sec - previous)
        };
        if let Some(interval) = interval.filter(|&i| i > 0.0) {
            self.measured_heart_rate_bpm = 60.0 / interval;
        }
        self.last_r_peak_sec = Some(newest_peak_sec);
    }

    /// Latch EDV entering ventricular systole and ESV/EF leaving it
    fn advance_phase(&mut self, next: CardiacPhase) {
        let was_systolic = self.phase == CardiacPhase::VentricularSystole;
        let is_systolic = next == CardiacPhase::VentricularSystole;
        if !was_systolic && is_systolic {
            self.end_diastolic_volume_mL = self.left_ventricle.volume_mL;
        } else if was_systolic && !is_systolic {
            self.end_systolic_volume_mL = self.left_ventricle.volume_mL;
            if self.end_diastolic_volume_mL > 0.0 {
                self.ejection_fraction = ((self.end_diastolic_volume_mL
                    - self.end_systolic_volume_mL)
                    / self.end_diastolic_volume_mL)
                    .clamp(0.0, 1.0);
            }
        }
        self.phase = next;
    }

    fn update_chamber_pressures(&mut self, fraction: f64) {
        let atrial = if self.phase == CardiacPhase::AtrialSystole {
            ChamberState::Systole
        } else {
            ChamberState::Diastole
        };
        let ventricular = if self.phase == CardiacPhase::VentricularSystole {
            ChamberState::Systole
        } else {
            ChamberState::Diastole
        };

        self.left_atrium.state = atrial;
        self.right_atrium.state = atrial;
        self.left_ventricle.state = ventricular;
        self.right_ventricle.state = ventricular;

        let (la, ra) = match atrial {
            ChamberState::Systole => (10.0, 7.0),
            ChamberState::Diastole => (5.0, 2.0),
        };
        self.left_atrium.pressure_mmHg = la;
        self.right_atrium.pressure_mmHg = ra;

        let (lv, rv) = match ventricular {
            ChamberState::Systole => {
                let ejection = ((fraction - 0.2) / 0.3 * PI).sin();
                (125.0 * ejection, 25.0 * ejection)
            }
            ChamberState::Diastole => (5.0, 2.0),
        };
        self.left_ventricle.pressure_mmHg = lv;
        self.right_ventricle.pressure_mmHg = rv;
    }

    /// Set the intrinsic rate (bpm), clamped to [30, 220]
    pub fn set_heart_rate(&mut self, rate_bpm: f64) {
        if !rate_bpm.is_finite() {
            log::warn!("Heart ignored non-finite rate {}", rate_bpm);
            return;
        }
        let rate = rate_bpm.clamp(HEART_RATE_RANGE_BPM.0, HEART_RATE_RANGE_BPM.1);
        self.heart_rate_bpm = rate;
        self.rate_setpoint_bpm = rate;
    }

    /// Measured heart rate from the last R-R interval (bpm)
    pub fn heart_rate(&self) -> f64 {
        self.measured_heart_rate_bpm
    }

    /// Intrinsic rate driving the cycle (bpm)
    pub fn intrinsic_heart_rate(&self) -> f64 {
        self.heart_rate_bpm
    }

    pub fn aortic_pressure(&self) -> f64 {
        self.aortic_pressure_mmHg
    }

    pub fn ejection_fraction(&self) -> f64 {
        self.ejection_fraction
    }

    pub fn end_diastolic_volume(&self) -> f64 {
        self.end_diastolic_volume_mL
    }

    pub fn end_systolic_volume(&self) -> f64 {
        self.end_systolic_volume_mL
    }

    pub fn phase(&self) -> CardiacPhase {
        self.phase
    }

    /// Position within the current cycle (s)
    pub fn cycle_position(&self) -> f64 {
        self.cycle_position_sec
    }

    pub fn valve_state(&self, valve: Valve) -> ValveState {
        self.valves.get(valve)
    }

    pub fn left_ventricle(&self) -> &Chamber {
        &self.left_ventricle
    }

    pub fn right_ventricle(&self) -> &Chamber {
        &self.right_ventricle
    }

    pub fn left_atrium(&self) -> &Chamber {
        &self.left_atrium
    }

    pub fn right_atrium(&self) -> &Chamber {
        &self.right_atrium
    }

    pub fn lead_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ekg_leads.iter().map(|(name, _)| *name)
    }

    pub fn lead_count(&self) -> usize {
        self.ekg_leads.len()
    }

    /// EKG trace for one lead, newest sample first
    pub fn ekg_lead(&self, name: &str) -> Option<&WaveformBuffer> {
        self.ekg_leads
            .iter()
            .find(|(lead, _)| *lead == name)
            .map(|(_, trace)| trace)
    }

    /// All EKG traces in lead order
    pub fn ekg_data(&self) -> impl Iterator<Item = (&'static str, &WaveformBuffer)> + '_ {
        self.ekg_leads.iter().map(|(name, trace)| (*name, trace))
    }
}

/// Amplitude factor `1 − 0.1·index` for an EKG lead.
///
/// Applied literally, so the twelfth lead (V6, gain −0.1) is a small
/// inverted copy of lead I rather than a flat line.
pub fn lead_gain(index: usize) -> f64 {
    1.0 - 0.1 * index as f64
}

/// Angiotensin-driven multiplier on arterial pressure
pub fn vasoconstriction_factor(angiotensin_au: f64) -> f64 {
    (1.0 + ANGIOTENSIN_GAIN * (angiotensin_au - 1.0)).clamp(0.8, 1.6)
}

impl Organ for Heart {
    fn id(&self) -> OrganId {
        self.id
    }

    fn kind(&self) -> OrganKind {
        OrganKind::Heart
    }

    fn summary(&self) -> String {
        let mut s = String::new();
        let _ = writeln!(s, "--- Heart Summary ---");
        let _ = writeln!(s, "Heart Rate (Measured): {:.2} bpm", self.measured_heart_rate_bpm);
        let _ = writeln!(s, "Phase: {}", self.phase.as_str());
        let _ = writeln!(s, "Ejection Fraction: {:.2}%", self.ejection_fraction * 100.0);
        let _ = writeln!(s, "Aortic Pressure: {:.2} mmHg", self.aortic_pressure_mmHg);
        let _ = writeln!(s);
        let _ = writeln!(s, "--- Chambers ---");
        for chamber in [
            &self.left_atrium,
            &self.right_atrium,
            &self.left_ventricle,
            &self.right_ventricle,
        ] {
            let _ = writeln!(
                s,
                " {}: {:.2} mL, {:.2} mmHg",
                chamber.name, chamber.volume_mL, chamber.pressure_mmHg
            );
        }
        let _ = writeln!(s);
        let _ = writeln!(s, "--- Valves ---");
        for valve in Valve::ALL {
            let _ = writeln!(s, " {}: {}", valve.name(), self.valves.get(valve).as_str());
        }
        let _ = writeln!(s, "EKG Leads: {}", self.ekg_leads.len());
        s
    }
}
