//! Patient orchestrator.
//!
//! A [`Patient`] owns the shared [`Blood`] record, one [`OrganSet`] and the
//! noise source threaded through every organ update. A tick walks
//! [`OrganKind::UPDATE_ORDER`] and clamps Blood after each organ, so later
//! organs read values written earlier in the same tick.

mod registry;

pub use registry::{OrganSet, RegisteredOrgan};

use std::fmt::Write;

use crate::config::Parameters;
use crate::dynamics::NoiseSource;
use crate::error::{Result, SimError};
use crate::organs::{
    Bladder, Brain, Esophagus, Gallbladder, Heart, Intestines, Kidneys, Liver, Lungs,
    OrganKind, Pancreas, SpinalCord, Spleen, Stomach,
};
use crate::state::{Blood, LabPanel, LabSources, VitalSigns};

/// Simulated patient
#[derive(Debug, Clone)]
pub struct Patient {
    id: u32,
    blood: Blood,
    organs: OrganSet,
    noise: NoiseSource,
    elapsed_sec: f64,
}

impl Patient {
    /// Build a patient from validated parameters, seeding noise from
    /// `simulation.rng_seed` (entropy when absent).
    pub fn with_parameters(id: u32, params: &Parameters) -> Result<Self> {
        let noise = NoiseSource::from_optional_seed(params.simulation.rng_seed);
        Self::with_noise(id, params, noise)
    }

    /// Build a patient with an explicit noise source
    pub fn with_noise(id: u32, params: &Parameters, noise: NoiseSource) -> Result<Self> {
        params.validate()?;
        let heart = Heart::with_leads(
            OrganKind::Heart.default_id(),
            params.simulation.ekg_lead_count,
            params.simulation.waveform_capacity,
        )?;
        Ok(Self::assemble(id, params, heart, noise))
    }

    fn assemble(id: u32, params: &Parameters, heart: Heart, noise: NoiseSource) -> Self {
        let capacity = params.simulation.waveform_capacity;
        let mut organs = OrganSet::new();
        organs.insert(heart);
        organs.insert(Lungs::with_capacity(OrganKind::Lungs.default_id(), capacity));
        organs.insert(Brain::with_capacity(OrganKind::Brain.default_id(), capacity));
        organs.insert(Liver::new(OrganKind::Liver.default_id()));
        organs.insert(Kidneys::new(OrganKind::Kidneys.default_id()));
        organs.insert(Bladder::new(OrganKind::Bladder.default_id(), &params.renal));
        organs.insert(Stomach::new(OrganKind::Stomach.default_id(), &params.digestive));
        organs.insert(Intestines::new(OrganKind::Intestines.default_id()));
        organs.insert(Gallbladder::new(OrganKind::Gallbladder.default_id(), &params.digestive));
        organs.insert(Pancreas::new(OrganKind::Pancreas.default_id()));
        organs.insert(Esophagus::new(OrganKind::Esophagus.default_id(), &params.digestive));
        organs.insert(Spleen::new(OrganKind::Spleen.default_id()));
        organs.insert(SpinalCord::new(OrganKind::SpinalCord.default_id()));

        log::info!(
            "Initialized patient {} with {} organs ({} EKG leads, noise {})",
            id,
            organs.len(),
            params.simulation.ekg_lead_count,
            if noise.is_silent() { "disabled" } else { "enabled" }
        );

        Self {
            id,
            blood: Blood::default(),
            organs,
            noise,
            elapsed_sec: 0.0,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn blood(&self) -> &Blood {
        &self.blood
    }

    /// Direct access for scripted scenarios (e.g. a toxin bolus).
    /// Values are clamped again on the next organ update.
    pub fn blood_mut(&mut self) -> &mut Blood {
        &mut self.blood
    }

    /// Simulated time advanced so far (s)
    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed_sec
    }

    pub fn organs(&self) -> &OrganSet {
        &self.organs
    }

    /// Typed lookup; `None` when the patient has no organ of that kind
    pub fn organ<T: RegisteredOrgan>(&self) -> Option<&T> {
        self.organs.organ::<T>()
    }

    pub fn organ_mut<T: RegisteredOrgan>(&mut self) -> Option<&mut T> {
        self.organs.organ_mut::<T>()
    }

    pub fn has_organ(&self, kind: OrganKind) -> bool {
        self.organs.contains(kind)
    }

    /// Install `organ`, returning the organ of the same kind it replaced
    pub fn insert_organ<T: RegisteredOrgan>(&mut self, organ: T) -> Option<T> {
        self.organs.insert(organ)
    }

    /// Remove the organ of `kind`; dependent organs fall back to defaults
    pub fn remove_organ(&mut self, kind: OrganKind) -> bool {
        let removed = self.organs.remove(kind);
        if removed {
            log::debug!("Patient {}: removed {}", self.id, kind);
        }
        removed
    }

    /// Snapshot of the monitored vitals
    pub fn vital_signs(&self) -> VitalSigns {
        VitalSigns {
            elapsed_sec: self.elapsed_sec,
            blood: self.blood.clone(),
            heart_rate_bpm: self.organ::<Heart>().map(Heart::heart_rate),
            aortic_pressure_mmHg: self.organ::<Heart>().map(Heart::aortic_pressure),
            respiration_rate_per_min: self.organ::<Lungs>().map(Lungs::respiration_rate),
            gcs_total: self.organ::<Brain>().map(Brain::gcs),
            bladder_volume_mL: self.organ::<Bladder>().map(Bladder::volume),
        }
    }

    /// Laboratory panels drawn now; absent organs report healthy values
    pub fn lab_panel(&self) -> LabPanel {
        let mut sources = LabSources::default();
        if let Some(kidneys) = self.organ::<Kidneys>() {
            sources.gfr_mL_per_min = kidneys.gfr();
            sources.sodium_mEq_per_L = kidneys.blood_sodium();
            sources.potassium_mEq_per_L = kidneys.blood_potassium();
        }
        if let Some(liver) = self.organ::<Liver>() {
            sources.liver_capacity = liver.metabolic_capacity();
            sources.alt_U_per_L = liver.alt_level();
            sources.ast_U_per_L = liver.ast_level();
            sources.bilirubin_mg_per_dL = liver.bilirubin_level();
        }
        if let Some(spleen) = self.organ::<Spleen>() {
            sources.splenic_lymphocytes = spleen.lymphocyte_count();
        }
        LabPanel::measure(&self.blood, &sources)
    }
}

/// Patient with one healthy organ of every kind and entropy-seeded noise
pub fn initialize_patient(id: u32) -> Patient {
    let params = Parameters::default();
    let heart = Heart::new(OrganKind::Heart.default_id());
    Patient::assemble(id, &params, heart, NoiseSource::from_entropy())
}

/// As [`initialize_patient`] with `lead_count` EKG leads (1..=12)
pub fn initialize_patient_with_leads(id: u32, lead_count: usize) -> Result<Patient> {
    let mut params = Parameters::default();
    params.simulation.ekg_lead_count = lead_count;
    Patient::with_parameters(id, &params)
}

/// Advance every organ by `dt_sec` in [`OrganKind::UPDATE_ORDER`].
///
/// Rejects a negative or non-finite step without touching any state.
pub fn update_patient(patient: &mut Patient, dt_sec: f64) -> Result<()> {
    if !dt_sec.is_finite() {
        return Err(SimError::invalid("dt_sec", dt_sec, "must be finite"));
    }
    if dt_sec < 0.0 {
        return Err(SimError::invalid("dt_sec", dt_sec, "must be non-negative"));
    }

    let Patient {
        blood,
        organs,
        noise,
        elapsed_sec,
        ..
    } = patient;

    for kind in OrganKind::UPDATE_ORDER {
        organs.advance(kind, blood, noise, dt_sec);
        blood.clamp_to_bounds();
        log::trace!("t={:.3}s {} updated", *elapsed_sec, kind);
    }
    *elapsed_sec += dt_sec;
    Ok(())
}

/// Summary of the organ named `organ_type`.
///
/// Unknown names are an error; a known kind the patient lacks is `Ok(None)`.
pub fn get_organ_summary(patient: &Patient, organ_type: &str) -> Result<Option<String>> {
    let kind: OrganKind = organ_type.parse()?;
    Ok(patient.organs.get(kind).map(|organ| organ.summary()))
}

/// CBC, metabolic panel, arterial gas and coagulation panel
pub fn get_lab_summary(patient: &Patient) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "=== Patient {} Labs ===", patient.id);
    s.push_str(&patient.lab_panel().render());
    s
}

/// Vitals followed by every present organ's summary
pub fn get_patient_summary(patient: &Patient) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "=== Patient {} ===", patient.id);
    let _ = writeln!(s, "{}", patient.vital_signs().render());
    for organ in patient.organs.iter() {
        let _ = writeln!(s, "[{} {}]", organ.kind(), organ.id());
        let _ = writeln!(s, "{}", organ.summary());
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_patient() -> Patient {
        Patient::with_noise(7, &Parameters::default(), NoiseSource::silent()).unwrap()
    }

    #[test]
    fn test_initialize_has_every_organ() {
        let patient = initialize_patient(1);
        assert_eq!(patient.id(), 1);
        assert_eq!(patient.organs().len(), OrganKind::ALL.len());
        for kind in OrganKind::ALL {
            let organ = patient.organs().get(kind).unwrap();
            assert_eq!(organ.kind(), kind);
            assert_eq!(organ.id(), kind.default_id());
        }
    }

    #[test]
    fn test_lead_count_validation() {
        let patient = initialize_patient_with_leads(1, 3).unwrap();
        assert_eq!(patient.organ::<Heart>().unwrap().lead_count(), 3);
        assert!(initialize_patient_with_leads(1, 0).is_err());
        assert!(initialize_patient_with_leads(1, 13).is_err());
    }

    #[test]
    fn test_invalid_dt_rejected() {
        let mut patient = silent_patient();
        assert!(update_patient(&mut patient, -1.0).is_err());
        assert!(update_patient(&mut patient, f64::NAN).is_err());
        assert_eq!(patient.elapsed_sec(), 0.0);
    }

    #[test]
    fn test_elapsed_time_accumulates() {
        let mut patient = silent_patient();
        for _ in 0..4 {
            update_patient(&mut patient, 0.25).unwrap();
        }
        assert!((patient.elapsed_sec() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_organ_summary_lookup() {
        let mut patient = silent_patient();
        let summary = get_organ_summary(&patient, "spinal cord").unwrap().unwrap();
        assert!(summary.contains("Spinal Cord"));

        assert!(patient.remove_organ(OrganKind::Heart));
        assert_eq!(get_organ_summary(&patient, "Heart").unwrap(), None);
        assert!(matches!(
            get_organ_summary(&patient, "Appendix"),
            Err(SimError::UnknownOrgan(_))
        ));
    }

    #[test]
    fn test_patient_summary_lists_organs() {
        let patient = silent_patient();
        let summary = get_patient_summary(&patient);
        assert!(summary.starts_with("=== Patient 7 ==="));
        for kind in OrganKind::ALL {
            assert!(summary.contains(&format!("[{} ", kind)), "missing {}", kind);
        }
    }

    #[test]
    fn test_lab_panel_reads_organs() {
        let mut patient = silent_patient();
        let baseline = patient.lab_panel();
        assert_eq!(baseline.cmp.creatinine_mg_per_dL, 0.9);
        assert_eq!(baseline.coagulation.inr, 1.0);

        patient.organ_mut::<Liver>().unwrap().damage_lobules(0.5).unwrap();
        update_patient(&mut patient, 0.0).unwrap();
        assert!((patient.lab_panel().coagulation.inr - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_lab_panel_without_source_organs() {
        let mut patient = silent_patient();
        for kind in [OrganKind::Kidneys, OrganKind::Liver, OrganKind::Spleen] {
            patient.remove_organ(kind);
        }
        let expected = LabPanel::measure(patient.blood(), &LabSources::default());
        assert_eq!(patient.lab_panel(), expected);
        assert!(get_lab_summary(&patient).starts_with("=== Patient 7 Labs ==="));
    }
}
