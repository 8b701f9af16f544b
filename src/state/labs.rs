//! Clinical laboratory panels derived from the blood record.
//!
//! Panels are computed on demand from [`Blood`] plus a few organ readings
//! ([`LabSources`]); nothing here is integrated over time. Quantities the
//! organ models do not drive sit at healthy adult reference values.
//!
//! | Panel | Driven by                                                   |
//! |-------|-------------------------------------------------------------|
//! | CBC   | spleen white pulp (lymphocytes)                             |
//! | CMP   | blood glucose, kidney GFR and electrolytes, liver markers   |
//! | ABG   | blood SpO2 and PaCO2 (Hill inversion, Henderson-Hasselbalch) |
//! | Coag  | liver metabolic capacity (clotting factor synthesis)        |

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::Blood;

/// Hemoglobin P50 at standard conditions (mmHg)
const P50_MMHG: f64 = 26.8;
/// Hill coefficient of the oxygen equilibrium curve
const HILL_COEFFICIENT: f64 = 2.7;
/// pKa of the bicarbonate buffer
const BICARBONATE_PKA: f64 = 6.1;
/// CO2 solubility (mmol/L per mmHg)
const CO2_SOLUBILITY: f64 = 0.03;
/// Plasma bicarbonate; no metabolic compensation is modeled (mEq/L)
const BICARBONATE_MEQ_PER_L: f64 = 24.0;
const CHLORIDE_MEQ_PER_L: f64 = 101.0;

/// Baseline GFR at which creatinine and BUN sit at their reference values
const REFERENCE_GFR_ML_PER_MIN: f64 = 125.0;
/// Spleen lymphocyte pool at baseline (millions)
const REFERENCE_SPLENIC_LYMPHOCYTES: f64 = 1500.0;

/// Organ-side inputs to the panels; `Default` is a healthy adult
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabSources {
    pub gfr_mL_per_min: f64,
    pub sodium_mEq_per_L: f64,
    pub potassium_mEq_per_L: f64,
    /// Liver metabolic capacity (0-1)
    pub liver_capacity: f64,
    pub alt_U_per_L: f64,
    pub ast_U_per_L: f64,
    pub bilirubin_mg_per_dL: f64,
    /// Splenic lymphocyte pool (millions)
    pub splenic_lymphocytes: f64,
}

impl Default for LabSources {
    fn default() -> Self {
        Self {
            gfr_mL_per_min: REFERENCE_GFR_ML_PER_MIN,
            sodium_mEq_per_L: 140.0,
            potassium_mEq_per_L: 4.0,
            liver_capacity: 1.0,
            alt_U_per_L: 25.0,
            ast_U_per_L: 25.0,
            bilirubin_mg_per_dL: 0.8,
            splenic_lymphocytes: REFERENCE_SPLENIC_LYMPHOCYTES,
        }
    }
}

/// White cell differential (cells/µL)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WbcDifferential {
    pub neutrophils: f64,
    pub lymphocytes: f64,
    pub monocytes: f64,
    pub eosinophils: f64,
    pub basophils: f64,
}

impl WbcDifferential {
    pub fn total(&self) -> f64 {
        self.neutrophils + self.lymphocytes + self.monocytes + self.eosinophils + self.basophils
    }
}

/// Complete blood count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompleteBloodCount {
    pub rbc_million_per_uL: f64,
    pub hemoglobin_g_per_dL: f64,
    pub hematocrit_pct: f64,
    pub mcv_fL: f64,
    pub mch_pg: f64,
    pub mchc_g_per_dL: f64,
    pub rdw_pct: f64,
    pub wbc: WbcDifferential,
    pub platelets_thousand_per_uL: f64,
    pub mpv_fL: f64,
}

impl CompleteBloodCount {
    fn measure(sources: &LabSources) -> Self {
        let lymphocyte_scale = sources.splenic_lymphocytes / REFERENCE_SPLENIC_LYMPHOCYTES;
        Self {
            rbc_million_per_uL: 5.0,
            hemoglobin_g_per_dL: 14.5,
            hematocrit_pct: 42.0,
            mcv_fL: 90.0,
            mch_pg: 29.0,
            mchc_g_per_dL: 34.0,
            rdw_pct: 13.0,
            wbc: WbcDifferential {
                neutrophils: 4000.0,
                lymphocytes: 2500.0 * lymphocyte_scale.max(0.0),
                monocytes: 500.0,
                eosinophils: 200.0,
                basophils: 50.0,
            },
            platelets_thousand_per_uL: 250.0,
            mpv_fL: 9.5,
        }
    }
}

/// Comprehensive metabolic panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetabolicPanel {
    pub glucose_mg_per_dL: f64,
    pub bun_mg_per_dL: f64,
    pub creatinine_mg_per_dL: f64,
    pub sodium_mEq_per_L: f64,
    pub potassium_mEq_per_L: f64,
    pub chloride_mEq_per_L: f64,
    pub bicarbonate_mEq_per_L: f64,
    pub calcium_mg_per_dL: f64,
    pub total_protein_g_per_dL: f64,
    pub albumin_g_per_dL: f64,
    pub bilirubin_total_mg_per_dL: f64,
    pub bilirubin_direct_mg_per_dL: f64,
    pub alt_U_per_L: f64,
    pub ast_U_per_L: f64,
    pub alp_U_per_L: f64,
}

impl MetabolicPanel {
    fn measure(blood: &Blood, sources: &LabSources) -> Self {
        // Creatinine and BUN accumulate as filtration falls
        let clearance = (sources.gfr_mL_per_min / REFERENCE_GFR_ML_PER_MIN).max(0.05);
        let liver = sources.liver_capacity.clamp(0.0, 1.0);
        let albumin = 1.5 + 2.5 * liver;
        Self {
            glucose_mg_per_dL: blood.glucose_mg_per_dL,
            bun_mg_per_dL: (12.0 / clearance).min(150.0),
            creatinine_mg_per_dL: (0.9 / clearance).min(15.0),
            sodium_mEq_per_L: sources.sodium_mEq_per_L,
            potassium_mEq_per_L: sources.potassium_mEq_per_L,
            chloride_mEq_per_L: CHLORIDE_MEQ_PER_L,
            bicarbonate_mEq_per_L: BICARBONATE_MEQ_PER_L,
            calcium_mg_per_dL: 9.5,
            total_protein_g_per_dL: 3.0 + albumin,
            albumin_g_per_dL: albumin,
            bilirubin_total_mg_per_dL: sources.bilirubin_mg_per_dL,
            bilirubin_direct_mg_per_dL: sources.bilirubin_mg_per_dL * 0.2,
            alt_U_per_L: sources.alt_U_per_L,
            ast_U_per_L: sources.ast_U_per_L,
            alp_U_per_L: 70.0,
        }
    }

    /// Na − (Cl + HCO3), normal 8-16 mEq/L
    pub fn anion_gap(&self) -> f64 {
        self.sodium_mEq_per_L - (self.chloride_mEq_per_L + self.bicarbonate_mEq_per_L)
    }

    /// Simplified MDRD estimate, 186 × Cr^−1.154 (mL/min/1.73m²)
    pub fn egfr(&self) -> f64 {
        186.0 * self.creatinine_mg_per_dL.powf(-1.154)
    }
}

/// Acid-base interpretation of an arterial gas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcidBaseStatus {
    Normal,
    RespiratoryAcidosis,
    MetabolicAcidosis,
    MixedAcidosis,
    RespiratoryAlkalosis,
    MetabolicAlkalosis,
    MixedAlkalosis,
}

impl AcidBaseStatus {
    pub fn classify(ph: f64, paco2_mmHg: f64, hco3_mEq_per_L: f64) -> Self {
        if ph < 7.35 {
            if paco2_mmHg > 45.0 {
                AcidBaseStatus::RespiratoryAcidosis
            } else if hco3_mEq_per_L < 22.0 {
                AcidBaseStatus::MetabolicAcidosis
            } else {
                AcidBaseStatus::MixedAcidosis
            }
        } else if ph > 7.45 {
            if paco2_mmHg < 35.0 {
                AcidBaseStatus::RespiratoryAlkalosis
            } else if hco3_mEq_per_L > 26.0 {
                AcidBaseStatus::MetabolicAlkalosis
            } else {
                AcidBaseStatus::MixedAlkalosis
            }
        } else {
            AcidBaseStatus::Normal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AcidBaseStatus::Normal => "Normal",
            AcidBaseStatus::RespiratoryAcidosis => "Respiratory Acidosis",
            AcidBaseStatus::MetabolicAcidosis => "Metabolic Acidosis",
            AcidBaseStatus::MixedAcidosis => "Mixed Acidosis",
            AcidBaseStatus::RespiratoryAlkalosis => "Respiratory Alkalosis",
            AcidBaseStatus::MetabolicAlkalosis => "Metabolic Alkalosis",
            AcidBaseStatus::MixedAlkalosis => "Mixed Alkalosis",
        }
    }
}

/// Arterial blood gas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArterialBloodGas {
    pub ph: f64,
    pub pao2_mmHg: f64,
    pub paco2_mmHg: f64,
    pub hco3_mEq_per_L: f64,
    pub base_excess_mEq_per_L: f64,
    pub sao2_pct: f64,
}

impl ArterialBloodGas {
    fn measure(blood: &Blood) -> Self {
        let paco2 = blood.co2_partial_pressure_mmHg;
        let hco3 = BICARBONATE_MEQ_PER_L;
        let ph = henderson_hasselbalch_ph(hco3, paco2);
        Self {
            ph,
            pao2_mmHg: pao2_from_saturation(blood.oxygen_saturation_pct),
            paco2_mmHg: paco2,
            hco3_mEq_per_L: hco3,
            // Van Slyke
            base_excess_mEq_per_L: 0.93 * (hco3 - 24.4 + 14.8 * (ph - 7.4)),
            sao2_pct: blood.oxygen_saturation_pct,
        }
    }

    pub fn acid_base_status(&self) -> AcidBaseStatus {
        AcidBaseStatus::classify(self.ph, self.paco2_mmHg, self.hco3_mEq_per_L)
    }
}

/// pH = pKa + log10(HCO3 / (0.03 · PaCO2))
pub fn henderson_hasselbalch_ph(hco3_mEq_per_L: f64, paco2_mmHg: f64) -> f64 {
    BICARBONATE_PKA + (hco3_mEq_per_L / (CO2_SOLUBILITY * paco2_mmHg.max(1.0))).log10()
}

/// Invert the Hill form of the oxygen equilibrium curve, S = P^n / (P50^n + P^n)
pub fn pao2_from_saturation(saturation_pct: f64) -> f64 {
    let s = (saturation_pct / 100.0).clamp(0.001, 0.999);
    P50_MMHG * (s / (1.0 - s)).powf(1.0 / HILL_COEFFICIENT)
}

/// Coagulation panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoagulationPanel {
    pub pt_sec: f64,
    pub inr: f64,
    pub aptt_sec: f64,
    pub fibrinogen_mg_per_dL: f64,
    pub d_dimer_ng_per_mL: f64,
    pub bleeding_time_min: f64,
    pub clotting_time_min: f64,
}

impl CoagulationPanel {
    fn measure(sources: &LabSources) -> Self {
        // Clotting factors are hepatic; synthesis falls with capacity
        let deficit = 1.0 - sources.liver_capacity.clamp(0.0, 1.0);
        let inr = 1.0 + 2.0 * deficit;
        Self {
            pt_sec: 12.0 * inr,
            inr,
            aptt_sec: 30.0 * (1.0 + 0.5 * deficit),
            fibrinogen_mg_per_dL: 300.0 * (1.0 - 0.7 * deficit),
            d_dimer_ng_per_mL: 250.0,
            bleeding_time_min: 4.0,
            clotting_time_min: 8.0 * (1.0 + deficit),
        }
    }
}

/// All panels drawn at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabPanel {
    pub cbc: CompleteBloodCount,
    pub cmp: MetabolicPanel,
    pub abg: ArterialBloodGas,
    pub coagulation: CoagulationPanel,
}

impl LabPanel {
    pub fn measure(blood: &Blood, sources: &LabSources) -> Self {
        Self {
            cbc: CompleteBloodCount::measure(sources),
            cmp: MetabolicPanel::measure(blood, sources),
            abg: ArterialBloodGas::measure(blood),
            coagulation: CoagulationPanel::measure(sources),
        }
    }

    /// Arterial oxygen content, Hb·1.34·SaO2 + 0.003·PaO2 (mL O2/dL)
    pub fn oxygen_content(&self) -> f64 {
        self.cbc.hemoglobin_g_per_dL * 1.34 * self.abg.sao2_pct / 100.0
            + 0.003 * self.abg.pao2_mmHg
    }

    pub fn render(&self) -> String {
        let mut s = String::new();
        let cbc = &self.cbc;
        let _ = writeln!(s, "=== Complete Blood Count ===");
        let _ = writeln!(
            s,
            "RBC: {:.2} M/uL | Hemoglobin: {:.1} g/dL | Hematocrit: {:.1}%",
            cbc.rbc_million_per_uL, cbc.hemoglobin_g_per_dL, cbc.hematocrit_pct
        );
        let _ = writeln!(
            s,
            "MCV: {:.1} fL | MCH: {:.1} pg | MCHC: {:.1} g/dL | RDW: {:.1}%",
            cbc.mcv_fL, cbc.mch_pg, cbc.mchc_g_per_dL, cbc.rdw_pct
        );
        let _ = writeln!(
            s,
            "WBC: {:.0}/uL (Neut {:.0}, Lymph {:.0}, Mono {:.0}, Eos {:.0}, Baso {:.0})",
            cbc.wbc.total(),
            cbc.wbc.neutrophils,
            cbc.wbc.lymphocytes,
            cbc.wbc.monocytes,
            cbc.wbc.eosinophils,
            cbc.wbc.basophils
        );
        let _ = writeln!(
            s,
            "Platelets: {:.0} K/uL | MPV: {:.1} fL",
            cbc.platelets_thousand_per_uL, cbc.mpv_fL
        );

        let cmp = &self.cmp;
        let _ = writeln!(s, "=== Comprehensive Metabolic Panel ===");
        let _ = writeln!(
            s,
            "Glucose: {:.0} mg/dL | BUN: {:.1} mg/dL | Creatinine: {:.2} mg/dL | eGFR: {:.0}",
            cmp.glucose_mg_per_dL,
            cmp.bun_mg_per_dL,
            cmp.creatinine_mg_per_dL,
            cmp.egfr()
        );
        let _ = writeln!(
            s,
            "Na: {:.1} | K: {:.2} | Cl: {:.1} | HCO3: {:.1} mEq/L | Anion Gap: {:.1}",
            cmp.sodium_mEq_per_L,
            cmp.potassium_mEq_per_L,
            cmp.chloride_mEq_per_L,
            cmp.bicarbonate_mEq_per_L,
            cmp.anion_gap()
        );
        let _ = writeln!(
            s,
            "Ca: {:.1} mg/dL | Total Protein: {:.1} g/dL | Albumin: {:.1} g/dL",
            cmp.calcium_mg_per_dL, cmp.total_protein_g_per_dL, cmp.albumin_g_per_dL
        );
        let _ = writeln!(
            s,
            "Bilirubin (T/D): {:.1}/{:.1} mg/dL | ALT: {:.0} | AST: {:.0} | ALP: {:.0} U/L",
            cmp.bilirubin_total_mg_per_dL,
            cmp.bilirubin_direct_mg_per_dL,
            cmp.alt_U_per_L,
            cmp.ast_U_per_L,
            cmp.alp_U_per_L
        );

        let abg = &self.abg;
        let _ = writeln!(s, "=== Arterial Blood Gas ===");
        let _ = writeln!(
            s,
            "pH: {:.2} | PaO2: {:.0} mmHg | PaCO2: {:.0} mmHg | HCO3: {:.1} mEq/L",
            abg.ph, abg.pao2_mmHg, abg.paco2_mmHg, abg.hco3_mEq_per_L
        );
        let _ = writeln!(
            s,
            "Base Excess: {:.1} mEq/L | SaO2: {:.1}% | CaO2: {:.1} mL/dL",
            abg.base_excess_mEq_per_L,
            abg.sao2_pct,
            self.oxygen_content()
        );
        let _ = writeln!(s, "Status: {}", abg.acid_base_status().as_str());

        let coag = &self.coagulation;
        let _ = writeln!(s, "=== Coagulation Panel ===");
        let _ = writeln!(
            s,
            "PT: {:.1} s | INR: {:.2} | aPTT: {:.1} s | Fibrinogen: {:.0} mg/dL",
            coag.pt_sec, coag.inr, coag.aptt_sec, coag.fibrinogen_mg_per_dL
        );
        let _ = writeln!(
            s,
            "D-Dimer: {:.0} ng/mL | Bleeding Time: {:.1} min | Clotting Time: {:.1} min",
            coag.d_dimer_ng_per_mL, coag.bleeding_time_min, coag.clotting_time_min
        );
        s
    }
}
