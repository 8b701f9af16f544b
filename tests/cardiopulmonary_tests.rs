//! Integration tests for the cardiopulmonary pair.
//!
//! Tests verify:
//! - Aortic pressure follows the ventricle while the aortic valve is open
//! - EKG lead selection and waveform history
//! - Brain chemoreflex drives the lungs through a patient tick
//! - Vasoconstriction couples blood angiotensin to systemic pressure

use patient_simulator_x::organs::heart::EKG_LEAD_NAMES;
use patient_simulator_x::organs::{CardiacPhase, Heart, Lungs, OrganId, Valve, VentilationMode};
use patient_simulator_x::{
    initialize_patient_with_leads, update_patient, Blood, NoiseSource, Parameters, Patient,
};

fn silent_patient() -> Patient {
    Patient::with_noise(1, &Parameters::default(), NoiseSource::silent()).unwrap()
}

// ============================================================================
// Heart
// ============================================================================

#[test]
fn test_aortic_pressure_at_fixed_rate() {
    let mut heart = Heart::new(OrganId(1));
    heart.set_heart_rate(60.0);
    let mut blood = Blood::default();
    let mut noise = NoiseSource::silent();

    let mut last_closed: Option<(f64, f64)> = None;
    let mut open_ticks = 0;
    for _ in 0..3000 {
        heart.update(&mut blood, &mut noise, 0.002);
        let aortic = heart.aortic_pressure();
        let position = heart.cycle_position();

        if heart.valve_state(Valve::Aortic).is_open() {
            open_ticks += 1;
            assert_eq!(aortic, heart.left_ventricle().pressure_mmHg);
            last_closed = None;
        } else {
            if let Some((prev_position, prev_aortic)) = last_closed {
                if position > prev_position {
                    assert!(
                        aortic <= prev_aortic,
                        "pressure rose from {} to {} with the valve closed",
                        prev_aortic,
                        aortic
                    );
                }
            }
            last_closed = Some((position, aortic));
        }
    }
    assert!(open_ticks > 0);
    assert_eq!(heart.intrinsic_heart_rate(), 60.0);
}

#[test]
fn test_measured_rate_follows_set_rate() {
    let mut heart = Heart::new(OrganId(1));
    heart.set_heart_rate(120.0);
    let mut blood = Blood::default();
    let mut noise = NoiseSource::silent();
    for _ in 0..5000 {
        heart.update(&mut blood, &mut noise, 0.001);
    }
    let measured = heart.heart_rate();
    assert!((measured - 120.0).abs() < 5.0, "measured {} bpm", measured);
}

#[test]
fn test_cardiac_phases_cycle() {
    let mut heart = Heart::new(OrganId(1));
    let mut blood = Blood::default();
    let mut noise = NoiseSource::silent();
    let mut seen = Vec::new();
    for _ in 0..800 {
        heart.update(&mut blood, &mut noise, 0.001);
        if seen.last() != Some(&heart.phase()) {
            seen.push(heart.phase());
        }
    }
    assert_eq!(
        &seen[..4],
        &[
            CardiacPhase::AtrialSystole,
            CardiacPhase::Diastole,
            CardiacPhase::VentricularSystole,
            CardiacPhase::Diastole,
        ]
    );
}

#[test]
fn test_vasoconstriction_raises_blood_pressure() {
    let mut heart = Heart::new(OrganId(1));
    let mut noise = NoiseSource::silent();

    let mut normal = Blood::default();
    heart.clone().update(&mut normal, &mut noise, 0.01);

    let mut constricted = Blood {
        angiotensin_au: 6.0,
        ..Blood::default()
    };
    heart.update(&mut constricted, &mut noise, 0.01);

    assert!(
        constricted.blood_pressure.systolic_mmHg > normal.blood_pressure.systolic_mmHg,
        "angiotensin should raise systolic pressure"
    );
    assert!(constricted.blood_pressure.diastolic_mmHg > normal.blood_pressure.diastolic_mmHg);
}

#[test]
fn test_ekg_lead_selection() {
    let mut patient = initialize_patient_with_leads(5, 3).unwrap();
    for _ in 0..50 {
        update_patient(&mut patient, 0.01).unwrap();
    }
    let heart = patient.organ::<Heart>().unwrap();
    let names: Vec<&str> = heart.lead_names().collect();
    assert_eq!(names, EKG_LEAD_NAMES[..3].to_vec());
    assert!(heart.ekg_lead("aVR").is_none());

    for (name, trace) in heart.ekg_data() {
        assert_eq!(trace.len(), 50, "lead {} should hold every sample", name);
    }
}

#[test]
fn test_ekg_history_is_bounded() {
    let mut params = Parameters::default();
    params.simulation.waveform_capacity = 64;
    let mut patient = Patient::with_noise(1, &params, NoiseSource::silent()).unwrap();
    for _ in 0..500 {
        update_patient(&mut patient, 0.01).unwrap();
    }
    let heart = patient.organ::<Heart>().unwrap();
    let lead = heart.ekg_lead("II").unwrap();
    assert_eq!(lead.len(), 64);
    assert_eq!(lead.capacity(), 64);
}

// ============================================================================
// Lungs
// ============================================================================

#[test]
fn test_chemoreflex_raises_respiration_rate() {
    let mut patient = silent_patient();
    for _ in 0..30 {
        patient.blood_mut().co2_partial_pressure_mmHg = 65.0;
        update_patient(&mut patient, 1.0).unwrap();
    }
    let lungs = patient.organ::<Lungs>().unwrap();
    assert!(
        lungs.respiration_rate() > 16.5,
        "respiration should rise with hypercapnia, got {}",
        lungs.respiration_rate()
    );
    assert!(lungs.respiration_rate() <= 35.0);
}

#[test]
fn test_lung_injury_is_permanent() {
    let mut patient = silent_patient();
    let healthy = patient.organ::<Lungs>().unwrap().total_compliance();
    patient.organ_mut::<Lungs>().unwrap().inflict_damage(0.4).unwrap();
    for _ in 0..100 {
        update_patient(&mut patient, 0.5).unwrap();
    }
    let injured = patient.organ::<Lungs>().unwrap().total_compliance();
    assert!((injured - healthy * 0.6).abs() < 1e-9);
}

#[test]
fn test_mechanical_ventilation_pressurizes_airway() {
    let mut lungs = Lungs::new(OrganId(2));
    lungs.set_ventilation_mode(VentilationMode::Mechanical);
    let mut blood = Blood::default();
    let mut noise = NoiseSource::silent();
    for _ in 0..400 {
        lungs.update(&mut blood, &mut noise, 0.01);
    }
    assert!(lungs.peak_inspiratory_pressure() > 5.0);

    lungs.set_ventilation_mode(VentilationMode::Spontaneous);
    for _ in 0..400 {
        lungs.update(&mut blood, &mut noise, 0.01);
    }
    assert_eq!(lungs.airway_pressure(), 0.0);
}
