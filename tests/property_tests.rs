//! Property-based tests for the clamp invariant.
//!
//! Whatever the step size in (0, 60] s and whatever the noise draws, every
//! clamped quantity stays inside its documented range after a tick.

use proptest::prelude::*;

use patient_simulator_x::dynamics::{relax_exponential, MeanReversion};
use patient_simulator_x::organs::{
    Bladder, Brain, Esophagus, Gallbladder, Heart, Intestines, Kidneys, Lungs, Pancreas,
    SpinalCord, Spleen, Stomach,
};
use patient_simulator_x::{update_patient, NoiseSource, Parameters, Patient};

fn seeded_patient(seed: u64) -> Patient {
    let mut params = Parameters::default();
    params.simulation.rng_seed = Some(seed);
    Patient::with_parameters(1, &params).expect("default parameters are valid")
}

fn in_range(value: f64, lo: f64, hi: f64) -> bool {
    value.is_finite() && value >= lo && value <= hi
}

// ============================================================================
// Primitive Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// **Mean reversion never leaves its bounds**, even for huge steps
    #[test]
    fn mean_reversion_stays_bounded(
        value in -1000.0f64..1000.0,
        baseline in -1000.0f64..1000.0,
        theta in 0.0f64..10.0,
        stddev in 0.0f64..50.0,
        dt in 0.0f64..60.0,
        seed in any::<u64>(),
    ) {
        let rule = MeanReversion::new(theta, stddev, -10.0, 10.0);
        let mut noise = NoiseSource::from_seed(seed);
        let next = rule.step(value, baseline, dt, &mut noise);
        prop_assert!(in_range(next, -10.0, 10.0), "step produced {}", next);
    }

    /// **Exponential relaxation never overshoots** its target
    #[test]
    fn relaxation_between_value_and_target(
        value in -500.0f64..500.0,
        target in -500.0f64..500.0,
        rate in 0.0f64..5.0,
        dt in 0.0f64..60.0,
    ) {
        let next = relax_exponential(value, target, rate, dt);
        let (lo, hi) = if value < target { (value, target) } else { (target, value) };
        prop_assert!(next >= lo - 1e-9 && next <= hi + 1e-9);
    }
}

// ============================================================================
// Patient Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// **Clamp invariant**: every organ and the blood stay in range after
    /// each tick for any dt in (0, 60] and any seed
    #[test]
    fn patient_clamp_invariant(
        seed in any::<u64>(),
        steps in prop::collection::vec(0.001f64..=60.0, 1..8),
        meal in 0.0f64..1500.0,
    ) {
        let mut patient = seeded_patient(seed);
        patient.organ_mut::<Stomach>().unwrap().add_substance(meal).unwrap();
        patient.organ_mut::<Esophagus>().unwrap().initiate_swallow(meal / 10.0).unwrap();

        for dt in steps {
            update_patient(&mut patient, dt).unwrap();

            let blood = patient.blood();
            prop_assert!(blood.is_within_bounds(), "blood out of bounds after dt={}: {:?}", dt, blood);

            let heart = patient.organ::<Heart>().unwrap();
            prop_assert!(in_range(heart.intrinsic_heart_rate(), 30.0, 220.0));
            prop_assert!(in_range(heart.left_ventricle().volume_mL, 40.0, 130.0));
            prop_assert!(in_range(heart.right_ventricle().volume_mL, 40.0, 130.0));
            prop_assert!(in_range(heart.ejection_fraction(), 0.0, 1.0));

            let lungs = patient.organ::<Lungs>().unwrap();
            prop_assert!(in_range(lungs.respiration_rate(), 4.0, 60.0));
            prop_assert!(in_range(lungs.tidal_volume(), 0.0, 3000.0));
            prop_assert!(in_range(lungs.oxygen_saturation(), 94.0, 100.0));
            prop_assert!(in_range(lungs.end_tidal_co2(), 35.0, 50.0));

            let brain = patient.organ::<Brain>().unwrap();
            prop_assert!((3..=15).contains(&brain.gcs()));
            prop_assert!(in_range(brain.intracranial_pressure(), 8.0, 12.0));
            prop_assert!(in_range(brain.target_respiration_rate(), 8.0, 35.0));
            prop_assert!(in_range(brain.target_heart_rate(), 50.0, 160.0));

            let kidneys = patient.organ::<Kidneys>().unwrap();
            prop_assert!(in_range(kidneys.gfr(), 0.0, 150.0));
            prop_assert!(in_range(kidneys.blood_sodium(), 135.0, 145.0));
            prop_assert!(in_range(kidneys.blood_potassium(), 3.5, 5.0));
            prop_assert!(in_range(kidneys.renin_secretion_rate(), 0.5, 50.0));

            let bladder = patient.organ::<Bladder>().unwrap();
            prop_assert!(in_range(bladder.volume(), 0.0, bladder.capacity()));

            let stomach = patient.organ::<Stomach>().unwrap();
            prop_assert!(in_range(stomach.volume(), 0.0, stomach.capacity()));
            prop_assert!(in_range(stomach.acidity(), 1.5, 4.5));

            let gallbladder = patient.organ::<Gallbladder>().unwrap();
            prop_assert!(in_range(gallbladder.stored_bile_volume(), 0.0, gallbladder.capacity()));
            prop_assert!(in_range(gallbladder.bile_concentration(), 1.0, 10.0));

            let pancreas = patient.organ::<Pancreas>().unwrap();
            prop_assert!(in_range(pancreas.insulin_secretion(), 0.5, 10.0));
            prop_assert!(in_range(pancreas.glucagon_secretion(), 20.0, 100.0));
            prop_assert!(in_range(pancreas.amylase_secretion(), 60.0, 100.0));
            prop_assert!(in_range(pancreas.lipase_secretion(), 20.0, 60.0));

            let intestines = patient.organ::<Intestines>().unwrap();
            prop_assert!(intestines.total_chyme_volume() >= 0.0);
            prop_assert!(in_range(intestines.segments()[0].motility, 0.9, 1.1));

            let esophagus = patient.organ::<Esophagus>().unwrap();
            prop_assert!(in_range(esophagus.motility(), 0.95, 1.05));

            let spinal_cord = patient.organ::<SpinalCord>().unwrap();
            prop_assert!(in_range(spinal_cord.motor_tract().conduction_velocity_m_per_s, 70.0, 80.0));
            prop_assert!(in_range(spinal_cord.sensory_tract().conduction_velocity_m_per_s, 60.0, 70.0));

            let spleen = patient.organ::<Spleen>().unwrap();
            prop_assert!(in_range(spleen.rbc_breakdown_rate(), 0.45, 0.55));
            prop_assert!(in_range(spleen.lymphocyte_count(), 1400.0, 1600.0));
        }
    }
}
