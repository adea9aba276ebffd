// ABOUTME: Built-in KPI formula table grouped by clinical category
// ABOUTME: Formulas are descriptive text for the inference step, never evaluated locally
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{KpiCategory, KpiDefinition};
use KpiCategory::{
    BodyComposition, Cardiovascular, Electrolytes, Glycemic, Hematology, Hepatic, Hormonal,
    Inflammation, Lifestyle, Lipids, Micronutrients, Renal, Thyroid,
};

/// Static form of a [`KpiDefinition`]
#[derive(Debug, Clone, Copy)]
pub struct BuiltinKpi {
    /// Stable identifier
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// Clinical grouping
    pub category: KpiCategory,
    /// Formula as descriptive text
    pub formula: &'static str,
    /// Canonical metric keys the formula consumes
    pub required: &'static [&'static str],
    /// What the KPI indicates
    pub description: &'static str,
}

impl BuiltinKpi {
    /// Owned definition
    #[must_use]
    pub fn to_definition(&self) -> KpiDefinition {
        KpiDefinition {
            id: self.id.to_owned(),
            name: self.name.to_owned(),
            category: self.category,
            formula: self.formula.to_owned(),
            required_metrics: self.required.iter().map(|&metric| metric.to_owned()).collect(),
            description: self.description.to_owned(),
        }
    }
}

/// Built-in KPI catalog in presentation order
#[rustfmt::skip]
pub static BUILTIN_KPIS: &[BuiltinKpi] = &[
    // Body composition
    BuiltinKpi { id: "bmi_class", name: "BMI Classification", category: BodyComposition, formula: "bmi: <18.5 under, 18.5-24.9 normal, 25-29.9 over, >=30 obese", required: &["bmi"], description: "WHO weight class from body mass index" },
    BuiltinKpi { id: "whtr", name: "Waist-to-Height Ratio", category: BodyComposition, formula: "waist / height (same length unit)", required: &["waist", "height"], description: "Central adiposity; >=0.5 flags elevated cardiometabolic risk" },
    BuiltinKpi { id: "whtr_band", name: "Waist-to-Height Risk Band", category: BodyComposition, formula: "waist_to_height_ratio: <0.4 low, 0.4-0.49 healthy, 0.5-0.59 increased, >=0.6 high", required: &["waist_to_height_ratio"], description: "Risk band for a precomputed waist-to-height ratio" },
    BuiltinKpi { id: "whr", name: "Waist-to-Hip Ratio", category: BodyComposition, formula: "waist / hip", required: &["waist", "hip"], description: "Fat distribution; WHO cut-offs 0.90 (male) and 0.85 (female)" },
    BuiltinKpi { id: "absi", name: "A Body Shape Index", category: BodyComposition, formula: "waist_m / (bmi^(2/3) * height_m^(1/2))", required: &["waist", "bmi", "height"], description: "Abdominal adiposity independent of BMI" },
    BuiltinKpi { id: "bri", name: "Body Roundness Index", category: BodyComposition, formula: "364.2 - 365.5 * sqrt(1 - (waist_m / (2*pi))^2 / (0.5 * height_m)^2)", required: &["waist", "height"], description: "Visceral fat estimate from body roundness" },
    BuiltinKpi { id: "conicity_index", name: "Conicity Index", category: BodyComposition, formula: "waist_m / (0.109 * sqrt(weight_kg / height_m))", required: &["waist", "weight", "height"], description: "Abdominal fat relative to a cylinder of the same weight and height" },
    BuiltinKpi { id: "bai", name: "Body Adiposity Index", category: BodyComposition, formula: "hip_cm / height_m^1.5 - 18", required: &["hip", "height"], description: "Body fat percentage estimate without weight" },
    BuiltinKpi { id: "fat_mass", name: "Fat Mass", category: BodyComposition, formula: "weight * body_fat_pct / 100", required: &["weight", "body_fat_pct"], description: "Absolute fat mass" },
    BuiltinKpi { id: "fat_free_mass", name: "Fat-Free Mass", category: BodyComposition, formula: "weight * (1 - body_fat_pct / 100)", required: &["weight", "body_fat_pct"], description: "Mass of everything except fat" },
    BuiltinKpi { id: "ffmi", name: "Fat-Free Mass Index", category: BodyComposition, formula: "weight * (1 - body_fat_pct / 100) / height_m^2", required: &["weight", "body_fat_pct", "height"], description: "Muscularity normalized for height" },
    BuiltinKpi { id: "fmi", name: "Fat Mass Index", category: BodyComposition, formula: "weight * body_fat_pct / 100 / height_m^2", required: &["weight", "body_fat_pct", "height"], description: "Adiposity normalized for height" },
    BuiltinKpi { id: "lean_mass_ratio", name: "Lean Mass Ratio", category: BodyComposition, formula: "lean_mass / weight * 100", required: &["lean_mass", "weight"], description: "Share of body weight that is lean tissue" },
    BuiltinKpi { id: "muscle_mass_pct", name: "Skeletal Muscle Percentage", category: BodyComposition, formula: "muscle_mass / weight * 100", required: &["muscle_mass", "weight"], description: "Share of body weight that is skeletal muscle" },
    BuiltinKpi { id: "bmr_katch_mcardle", name: "BMR (Katch-McArdle)", category: BodyComposition, formula: "370 + 21.6 * lean_mass_kg", required: &["lean_mass"], description: "Resting energy expenditure from lean mass" },
    BuiltinKpi { id: "bmr_mifflin", name: "BMR (Mifflin-St Jeor)", category: BodyComposition, formula: "10 * weight_kg + 6.25 * height_cm - 5 * age + s (s=+5 male, -161 female)", required: &["weight", "height", "age"], description: "Resting energy expenditure from weight, height and age" },
    BuiltinKpi { id: "healthy_weight_range", name: "Healthy Weight Range", category: BodyComposition, formula: "18.5 * height_m^2 .. 24.9 * height_m^2", required: &["height"], description: "Weight range corresponding to a normal BMI" },
    BuiltinKpi { id: "visceral_fat_band", name: "Visceral Fat Band", category: BodyComposition, formula: "visceral_fat: 1-9 healthy, 10-14 high, >=15 very high", required: &["visceral_fat"], description: "Bioimpedance visceral fat rating band" },
    // Cardiovascular
    BuiltinKpi { id: "bp_category", name: "Blood Pressure Category", category: Cardiovascular, formula: "ACC/AHA: normal <120/<80, elevated 120-129/<80, stage1 130-139 or 80-89, stage2 >=140 or >=90", required: &["systolic_bp", "diastolic_bp"], description: "Hypertension stage" },
    BuiltinKpi { id: "pulse_pressure", name: "Pulse Pressure", category: Cardiovascular, formula: "systolic_bp - diastolic_bp", required: &["systolic_bp", "diastolic_bp"], description: "Arterial stiffness proxy; >60 mmHg elevated" },
    BuiltinKpi { id: "map_band", name: "Mean Arterial Pressure Band", category: Cardiovascular, formula: "mean_arterial_pressure: 70-100 mmHg normal", required: &["mean_arterial_pressure"], description: "Organ perfusion pressure band" },
    BuiltinKpi { id: "rate_pressure_product", name: "Rate-Pressure Product", category: Cardiovascular, formula: "resting_hr * systolic_bp", required: &["resting_hr", "systolic_bp"], description: "Myocardial oxygen demand index" },
    BuiltinKpi { id: "shock_index", name: "Shock Index", category: Cardiovascular, formula: "resting_hr / systolic_bp", required: &["resting_hr", "systolic_bp"], description: "Haemodynamic stability; >0.9 abnormal" },
    BuiltinKpi { id: "predicted_max_hr", name: "Age-Predicted Max Heart Rate", category: Cardiovascular, formula: "208 - 0.7 * age", required: &["age"], description: "Tanaka estimate of maximum heart rate" },
    BuiltinKpi { id: "hr_reserve", name: "Heart Rate Reserve", category: Cardiovascular, formula: "max_hr - resting_hr", required: &["max_hr", "resting_hr"], description: "Range available for training zones" },
    BuiltinKpi { id: "resting_hr_fraction", name: "Resting-to-Predicted Max HR", category: Cardiovascular, formula: "resting_hr / (208 - 0.7 * age) * 100", required: &["resting_hr", "age"], description: "Resting heart rate as a share of predicted maximum" },
    BuiltinKpi { id: "vo2max_uth", name: "VO2max Estimate (Uth)", category: Cardiovascular, formula: "15.3 * max_hr / resting_hr", required: &["max_hr", "resting_hr"], description: "Aerobic capacity estimate from heart rate ratio" },
    BuiltinKpi { id: "vo2max_class", name: "VO2max Fitness Class", category: Cardiovascular, formula: "vo2max against age-banded norms", required: &["vo2max", "age"], description: "Cardiorespiratory fitness percentile band" },
    BuiltinKpi { id: "fitness_age", name: "Fitness Age", category: Cardiovascular, formula: "age at which vo2max equals the population median", required: &["vo2max", "age"], description: "Age equivalent of current aerobic capacity" },
    BuiltinKpi { id: "hrv_band", name: "HRV Band", category: Cardiovascular, formula: "hrv (RMSSD ms) against age-typical range", required: &["hrv"], description: "Autonomic balance and recovery status" },
    BuiltinKpi { id: "spo2_band", name: "Oxygen Saturation Band", category: Cardiovascular, formula: "spo2: >=95 normal, 91-94 low, <=90 hypoxaemia", required: &["spo2"], description: "Peripheral oxygenation" },
    BuiltinKpi { id: "respiratory_rate_band", name: "Respiratory Rate Band", category: Cardiovascular, formula: "respiratory_rate: 12-20 breaths/min normal", required: &["respiratory_rate"], description: "Resting breathing rate" },
    // Lipids
    BuiltinKpi { id: "non_hdl", name: "Non-HDL Cholesterol", category: Lipids, formula: "total_cholesterol - hdl", required: &["total_cholesterol", "hdl"], description: "Cholesterol carried by all atherogenic particles" },
    BuiltinKpi { id: "castelli_i", name: "Castelli Risk Index I", category: Lipids, formula: "total_cholesterol / hdl", required: &["total_cholesterol", "hdl"], description: "Total/HDL ratio; >5 elevated risk" },
    BuiltinKpi { id: "castelli_ii", name: "Castelli Risk Index II", category: Lipids, formula: "ldl / hdl", required: &["ldl", "hdl"], description: "LDL/HDL ratio; >3 elevated risk" },
    BuiltinKpi { id: "tg_hdl", name: "Triglyceride/HDL Ratio", category: Lipids, formula: "triglycerides / hdl (mg/dL)", required: &["triglycerides", "hdl"], description: "Insulin resistance and small dense LDL proxy" },
    BuiltinKpi { id: "aip", name: "Atherogenic Index of Plasma", category: Lipids, formula: "log10(triglycerides_mmol / hdl_mmol)", required: &["triglycerides", "hdl"], description: "<0.11 low, 0.11-0.21 intermediate, >0.21 high risk" },
    BuiltinKpi { id: "atherogenic_coefficient", name: "Atherogenic Coefficient", category: Lipids, formula: "(total_cholesterol - hdl) / hdl", required: &["total_cholesterol", "hdl"], description: "Atherogenic to anti-atherogenic cholesterol" },
    BuiltinKpi { id: "non_hdl_hdl_ratio", name: "Non-HDL/HDL Ratio", category: Lipids, formula: "non_hdl / hdl", required: &["non_hdl", "hdl"], description: "Second-order ratio using derived Non-HDL" },
    BuiltinKpi { id: "ldl_friedewald", name: "LDL (Friedewald)", category: Lipids, formula: "total_cholesterol - hdl - triglycerides / 5 (mg/dL, TG < 400)", required: &["total_cholesterol", "hdl", "triglycerides"], description: "Calculated LDL cholesterol" },
    BuiltinKpi { id: "ldl_sampson", name: "LDL (Sampson-NIH)", category: Lipids, formula: "tc/0.948 - hdl/0.971 - (tg/8.56 + tg*(tc-hdl)/2140 - tg^2/16100) - 9.44", required: &["total_cholesterol", "hdl", "triglycerides"], description: "Calculated LDL accurate at higher triglycerides" },
    BuiltinKpi { id: "ldl_martin_hopkins", name: "LDL (Martin-Hopkins)", category: Lipids, formula: "total_cholesterol - hdl - triglycerides / f (f from TG and non-HDL strata)", required: &["total_cholesterol", "hdl", "triglycerides"], description: "Calculated LDL with adjustable TG factor" },
    BuiltinKpi { id: "remnant_cholesterol_band", name: "Remnant Cholesterol Band", category: Lipids, formula: "remnant_cholesterol: <24 mg/dL desirable", required: &["remnant_cholesterol"], description: "Triglyceride-rich lipoprotein cholesterol" },
    BuiltinKpi { id: "remnant_ldl_ratio", name: "Remnant/LDL Ratio", category: Lipids, formula: "remnant_cholesterol / ldl", required: &["remnant_cholesterol", "ldl"], description: "Residual risk beyond LDL" },
    BuiltinKpi { id: "apob_apoa1", name: "ApoB/ApoA1 Ratio", category: Lipids, formula: "apob / apoa1", required: &["apob", "apoa1"], description: "Balance of atherogenic and protective particles" },
    BuiltinKpi { id: "apob_ldl", name: "ApoB/LDL Ratio", category: Lipids, formula: "apob / ldl", required: &["apob", "ldl"], description: "Particle number discordance with LDL cholesterol" },
    BuiltinKpi { id: "lp_a_band", name: "Lipoprotein(a) Risk", category: Lipids, formula: "lp_a: <30 mg/dL (75 nmol/L) low, >50 mg/dL (125 nmol/L) high", required: &["lp_a"], description: "Genetically determined atherogenic particle" },
    // Glycemic
    BuiltinKpi { id: "homa_ir_band", name: "HOMA-IR Band", category: Glycemic, formula: "homa_ir: <1 optimal, 1-1.9 normal, 2-2.9 early IR, >=3 significant IR", required: &["homa_ir"], description: "Insulin resistance band" },
    BuiltinKpi { id: "homa_b", name: "HOMA-B", category: Glycemic, formula: "360 * insulin / (glucose_mg - 63)", required: &["glucose", "insulin"], description: "Beta-cell function percentage" },
    BuiltinKpi { id: "quicki", name: "QUICKI", category: Glycemic, formula: "1 / (log10(insulin) + log10(glucose_mg))", required: &["glucose", "insulin"], description: "Insulin sensitivity check index; <0.339 insulin resistant" },
    BuiltinKpi { id: "mcauley_index", name: "McAuley Index", category: Glycemic, formula: "exp(2.63 - 0.28 * ln(insulin) - 0.31 * ln(triglycerides_mmol))", required: &["insulin", "triglycerides"], description: "Insulin sensitivity from fasting insulin and TG" },
    BuiltinKpi { id: "eag", name: "Estimated Average Glucose", category: Glycemic, formula: "28.7 * hba1c - 46.7 (mg/dL)", required: &["hba1c"], description: "Mean glucose implied by HbA1c" },
    BuiltinKpi { id: "hba1c_band", name: "HbA1c Band", category: Glycemic, formula: "hba1c: <5.7 normal, 5.7-6.4 prediabetes, >=6.5 diabetes", required: &["hba1c"], description: "Long-term glycaemic status" },
    BuiltinKpi { id: "glycation_gap", name: "Glycation Gap", category: Glycemic, formula: "glucose_mg - (28.7 * hba1c - 46.7)", required: &["glucose", "hba1c"], description: "Fasting glucose against HbA1c-implied average" },
    BuiltinKpi { id: "tyg", name: "Triglyceride-Glucose Index", category: Glycemic, formula: "ln(triglycerides_mg * glucose_mg / 2)", required: &["triglycerides", "glucose"], description: "Insulin resistance surrogate; >8.5 elevated" },
    BuiltinKpi { id: "tyg_bmi", name: "TyG-BMI", category: Glycemic, formula: "ln(triglycerides_mg * glucose_mg / 2) * bmi", required: &["triglycerides", "glucose", "bmi"], description: "TyG weighted by adiposity" },
    BuiltinKpi { id: "tyg_whtr", name: "TyG-WHtR", category: Glycemic, formula: "ln(triglycerides_mg * glucose_mg / 2) * waist_to_height_ratio", required: &["triglycerides", "glucose", "waist_to_height_ratio"], description: "TyG weighted by central adiposity" },
    BuiltinKpi { id: "mets_ir", name: "METS-IR", category: Glycemic, formula: "ln(2 * glucose_mg + triglycerides_mg) * bmi / ln(hdl_mg)", required: &["glucose", "triglycerides", "bmi", "hdl"], description: "Metabolic score for insulin resistance; >50 elevated" },
    BuiltinKpi { id: "lap", name: "Lipid Accumulation Product", category: Glycemic, formula: "(waist_cm - 65) * triglycerides_mmol (male), (waist_cm - 58) * triglycerides_mmol (female)", required: &["waist", "triglycerides"], description: "Visceral lipid accumulation" },
    BuiltinKpi { id: "vai", name: "Visceral Adiposity Index", category: Glycemic, formula: "(waist_cm / (39.68 + 1.88 * bmi)) * (tg_mmol / 1.03) * (1.31 / hdl_mmol) (male)", required: &["waist", "bmi", "triglycerides", "hdl"], description: "Visceral fat function" },
    // Renal
    BuiltinKpi { id: "egfr_ckd_epi", name: "eGFR (CKD-EPI 2021)", category: Renal, formula: "142 * min(scr/k,1)^a * max(scr/k,1)^-1.2 * 0.9938^age (* 1.012 female)", required: &["creatinine", "age"], description: "Estimated glomerular filtration rate from creatinine" },
    BuiltinKpi { id: "egfr_cystatin", name: "eGFR (CKD-EPI Cystatin C)", category: Renal, formula: "133 * min(cys/0.8,1)^-0.499 * max(cys/0.8,1)^-1.328 * 0.996^age", required: &["cystatin_c", "age"], description: "Filtration estimate independent of muscle mass" },
    BuiltinKpi { id: "ckd_stage", name: "CKD G Stage", category: Renal, formula: "egfr: G1 >=90, G2 60-89, G3a 45-59, G3b 30-44, G4 15-29, G5 <15", required: &["egfr"], description: "KDIGO filtration stage" },
    BuiltinKpi { id: "bun_creatinine", name: "BUN/Creatinine Ratio", category: Renal, formula: "bun / creatinine (mg/dL)", required: &["bun", "creatinine"], description: "Prerenal versus intrinsic pattern; 10-20 normal" },
    BuiltinKpi { id: "uacr", name: "Urine Albumin/Creatinine Ratio", category: Renal, formula: "urine_albumin_mg / urine_creatinine_g", required: &["urine_albumin", "urine_creatinine"], description: "Albuminuria; A1 <30, A2 30-300, A3 >300 mg/g" },
    BuiltinKpi { id: "kdigo_risk", name: "KDIGO Risk Grid", category: Renal, formula: "G stage from egfr crossed with A stage from urine_albumin / urine_creatinine", required: &["egfr", "urine_albumin", "urine_creatinine"], description: "Combined CKD prognosis" },
    BuiltinKpi { id: "uric_acid_band", name: "Uric Acid Band", category: Renal, formula: "uric_acid: >6.8 mg/dL above saturation", required: &["uric_acid"], description: "Hyperuricaemia and gout risk" },
    BuiltinKpi { id: "uric_acid_creatinine", name: "Uric Acid/Creatinine Ratio", category: Renal, formula: "uric_acid / creatinine", required: &["uric_acid", "creatinine"], description: "Renal-function-adjusted uric acid" },
    // Hepatic
    BuiltinKpi { id: "de_ritis", name: "De Ritis Ratio", category: Hepatic, formula: "ast / alt", required: &["ast", "alt"], description: "AST/ALT; >2 suggests alcoholic pattern, >1 fibrosis" },
    BuiltinKpi { id: "fib4", name: "FIB-4 Index", category: Hepatic, formula: "age * ast / (platelets * sqrt(alt))", required: &["age", "ast", "alt", "platelets"], description: "Liver fibrosis; <1.3 low, >2.67 high" },
    BuiltinKpi { id: "apri", name: "AST to Platelet Ratio Index", category: Hepatic, formula: "(ast / 40) / platelets * 100", required: &["ast", "platelets"], description: "Fibrosis screening; >1 suggests cirrhosis" },
    BuiltinKpi { id: "nfs", name: "NAFLD Fibrosis Score", category: Hepatic, formula: "-1.675 + 0.037*age + 0.094*bmi + 1.13*IFG + 0.99*ast/alt - 0.013*platelets - 0.66*albumin", required: &["age", "bmi", "glucose", "ast", "alt", "platelets", "albumin"], description: "Advanced fibrosis in fatty liver disease" },
    BuiltinKpi { id: "fli", name: "Fatty Liver Index", category: Hepatic, formula: "e^L / (1 + e^L) * 100, L = 0.953*ln(tg) + 0.139*bmi + 0.718*ln(ggt) + 0.053*waist - 15.745", required: &["triglycerides", "bmi", "ggt", "waist"], description: "Steatosis probability; >=60 likely" },
    BuiltinKpi { id: "hsi", name: "Hepatic Steatosis Index", category: Hepatic, formula: "8 * alt / ast + bmi (+2 if diabetic, +2 if female)", required: &["alt", "ast", "bmi"], description: "Steatosis screening; >36 likely" },
    BuiltinKpi { id: "ag_ratio", name: "Albumin/Globulin Ratio", category: Hepatic, formula: "albumin / (total_protein - albumin)", required: &["albumin", "total_protein"], description: "Protein balance; <1 warrants review" },
    BuiltinKpi { id: "ggt_hdl", name: "GGT/HDL Ratio", category: Hepatic, formula: "ggt / hdl", required: &["ggt", "hdl"], description: "Oxidative and cardiometabolic stress marker" },
    // Hematology
    BuiltinKpi { id: "nlr", name: "Neutrophil-to-Lymphocyte Ratio", category: Hematology, formula: "neutrophils / lymphocytes", required: &["neutrophils", "lymphocytes"], description: "Systemic inflammation; 1-3 normal" },
    BuiltinKpi { id: "plr", name: "Platelet-to-Lymphocyte Ratio", category: Hematology, formula: "platelets / lymphocytes", required: &["platelets", "lymphocytes"], description: "Inflammatory and thrombotic activity" },
    BuiltinKpi { id: "lmr", name: "Lymphocyte-to-Monocyte Ratio", category: Hematology, formula: "lymphocytes / monocytes", required: &["lymphocytes", "monocytes"], description: "Immune balance; low values adverse" },
    BuiltinKpi { id: "siri", name: "Systemic Inflammation Response Index", category: Hematology, formula: "neutrophils * monocytes / lymphocytes", required: &["neutrophils", "monocytes", "lymphocytes"], description: "Composite innate immune activation" },
    BuiltinKpi { id: "sii", name: "Systemic Immune-Inflammation Index", category: Hematology, formula: "platelets * neutrophils / lymphocytes", required: &["platelets", "neutrophils", "lymphocytes"], description: "Composite inflammation and thrombosis index" },
    BuiltinKpi { id: "mchc", name: "Mean Corpuscular Hemoglobin Concentration", category: Hematology, formula: "hemoglobin / hematocrit * 100", required: &["hemoglobin", "hematocrit"], description: "Red cell hemoglobin density; 32-36 g/dL" },
    BuiltinKpi { id: "mch", name: "Mean Corpuscular Hemoglobin", category: Hematology, formula: "hemoglobin_g_dl * 10 / rbc", required: &["hemoglobin", "rbc"], description: "Hemoglobin per red cell; 27-33 pg" },
    BuiltinKpi { id: "mentzer_index", name: "Mentzer Index", category: Hematology, formula: "mcv / rbc", required: &["mcv", "rbc"], description: "<13 suggests thalassaemia trait, >13 iron deficiency" },
    BuiltinKpi { id: "tsat", name: "Transferrin Saturation", category: Hematology, formula: "iron / tibc * 100", required: &["iron", "tibc"], description: "Iron availability; <20% deficient, >45% overload" },
    BuiltinKpi { id: "ferritin_band", name: "Ferritin Band", category: Hematology, formula: "ferritin: <30 ng/mL depleted stores", required: &["ferritin"], description: "Iron stores" },
    // Inflammation
    BuiltinKpi { id: "crp_band", name: "hs-CRP Risk Band", category: Inflammation, formula: "crp: <1 low, 1-3 average, >3 high (mg/L)", required: &["crp"], description: "Cardiovascular inflammatory risk" },
    BuiltinKpi { id: "crp_albumin", name: "CRP/Albumin Ratio", category: Inflammation, formula: "crp / albumin", required: &["crp", "albumin"], description: "Inflammation adjusted for nutritional status" },
    BuiltinKpi { id: "crp_hdl", name: "CRP/HDL Ratio", category: Inflammation, formula: "crp / hdl", required: &["crp", "hdl"], description: "Inflammatory load against protective lipids" },
    BuiltinKpi { id: "homocysteine_band", name: "Homocysteine Band", category: Inflammation, formula: "homocysteine: <10 optimal, 10-15 moderate, >15 elevated (umol/L)", required: &["homocysteine"], description: "Vascular and methylation risk" },
    // Thyroid
    BuiltinKpi { id: "tsh_band", name: "TSH Band", category: Thyroid, formula: "tsh: 0.4-4.0 mIU/L reference", required: &["tsh"], description: "Pituitary thyroid drive" },
    BuiltinKpi { id: "tsh_index", name: "Jostel TSH Index", category: Thyroid, formula: "ln(tsh) + 0.1345 * free_t4 (pmol/L)", required: &["tsh", "free_t4"], description: "Pituitary thyrotropic function" },
    BuiltinKpi { id: "ft3_ft4", name: "Free T3/Free T4 Ratio", category: Thyroid, formula: "free_t3 / free_t4 (pmol/L)", required: &["free_t3", "free_t4"], description: "Peripheral deiodinase activity" },
    // Hormonal
    BuiltinKpi { id: "fai", name: "Free Androgen Index", category: Hormonal, formula: "testosterone_nmol / shbg_nmol * 100", required: &["testosterone", "shbg"], description: "Bioavailable androgen estimate" },
    BuiltinKpi { id: "cortisol_band", name: "Morning Cortisol Band", category: Hormonal, formula: "cortisol: 6-23 ug/dL morning reference", required: &["cortisol"], description: "HPA axis output" },
    // Micronutrients
    BuiltinKpi { id: "vitamin_d_band", name: "Vitamin D Status", category: Micronutrients, formula: "vitamin_d: <20 deficient, 20-29 insufficient, 30-100 sufficient (ng/mL)", required: &["vitamin_d"], description: "25-OH vitamin D sufficiency" },
    BuiltinKpi { id: "b12_band", name: "Vitamin B12 Status", category: Micronutrients, formula: "b12: <200 deficient, 200-300 borderline (pg/mL)", required: &["b12"], description: "Cobalamin sufficiency" },
    BuiltinKpi { id: "b12_homocysteine", name: "B12-Homocysteine Pattern", category: Micronutrients, formula: "low b12 with homocysteine > 15 suggests functional deficiency", required: &["b12", "homocysteine"], description: "Functional cobalamin status" },
    // Electrolytes
    BuiltinKpi { id: "anion_gap", name: "Anion Gap", category: Electrolytes, formula: "sodium - (chloride + bicarbonate)", required: &["sodium", "chloride", "bicarbonate"], description: "Unmeasured anions; 8-12 mEq/L" },
    BuiltinKpi { id: "anion_gap_k", name: "Anion Gap (with Potassium)", category: Electrolytes, formula: "sodium + potassium - (chloride + bicarbonate)", required: &["sodium", "potassium", "chloride", "bicarbonate"], description: "Unmeasured anions including potassium; 12-16 mEq/L" },
    BuiltinKpi { id: "corrected_calcium", name: "Albumin-Corrected Calcium", category: Electrolytes, formula: "calcium + 0.8 * (4 - albumin_g_dl)", required: &["calcium", "albumin"], description: "Calcium adjusted for protein binding" },
    BuiltinKpi { id: "serum_osmolality", name: "Calculated Serum Osmolality", category: Electrolytes, formula: "2 * sodium + glucose_mg / 18 + bun / 2.8", required: &["sodium", "glucose", "bun"], description: "Plasma osmolality; 275-295 mOsm/kg" },
    BuiltinKpi { id: "na_k_ratio", name: "Sodium/Potassium Ratio", category: Electrolytes, formula: "sodium / potassium", required: &["sodium", "potassium"], description: "Adrenal mineralocorticoid balance" },
    // Lifestyle
    BuiltinKpi { id: "sleep_band", name: "Sleep Duration Band", category: Lifestyle, formula: "sleep_duration: 7-9 h recommended for adults", required: &["sleep_duration"], description: "Sleep sufficiency" },
    BuiltinKpi { id: "steps_band", name: "Daily Steps Band", category: Lifestyle, formula: "steps: <5000 sedentary, 5000-7499 low, 7500-9999 somewhat active, >=10000 active", required: &["steps"], description: "Habitual activity level" },
    BuiltinKpi { id: "resting_hr_band", name: "Resting Heart Rate Band", category: Lifestyle, formula: "resting_hr: <60 athletic, 60-80 normal, >80 elevated", required: &["resting_hr"], description: "Resting cardiac load and conditioning" },
];
