//! Patient intake record and its field domains.

use std::ops::RangeInclusive;

// Valid domains for the numeric intake fields. The form renders these as
// input bounds and the server re-checks them on submission.
pub const AGE_RANGE: RangeInclusive<u32> = 1..=120;
pub const RESTING_BP_RANGE: RangeInclusive<u32> = 1..=499;
pub const CHOLESTEROL_RANGE: RangeInclusive<u32> = 1..=999;
pub const MAX_HEART_RATE_RANGE: RangeInclusive<u32> = 1..=299;
pub const OLDPEAK_RANGE: RangeInclusive<f64> = 0.0..=10.0;
pub const MAJOR_VESSELS_RANGE: RangeInclusive<u32> = 0..=4;

/// Raw intake data for one patient, exactly as submitted by the form.
///
/// Categorical fields hold the label the form offered; translating a label
/// to the numeric code the classifier was trained on is [`crate::encoding`]'s
/// job. All thirteen fields are mandatory.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    /// Age in years.
    pub age: u32,
    /// "male" or "female".
    pub sex: String,
    /// Chest pain type label.
    pub chest_pain: String,
    /// Resting blood pressure in mm Hg.
    pub resting_bp: u32,
    /// Resting electrocardiographic result label.
    pub resting_ecg: String,
    /// Serum cholesterol in mg/dl.
    pub cholesterol: u32,
    /// Whether fasting blood sugar exceeds 120 mg/dl, "Yes" or "No".
    pub fasting_blood_sugar: String,
    /// Maximum heart rate achieved.
    pub max_heart_rate: u32,
    /// Exercise induced angina, "Yes" or "No".
    pub exercise_angina: String,
    /// ST depression induced by exercise relative to rest.
    pub oldpeak: f64,
    /// Heart rate slope label.
    pub slope: String,
    /// Number of major vessels colored by fluoroscopy.
    pub major_vessels: u32,
    /// Thallium stress test result label.
    pub thalassemia: String,
}

impl PatientRecord {
    /// Check every numeric field against its declared domain, collecting all
    /// violations rather than stopping at the first.
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !AGE_RANGE.contains(&self.age) {
            errors.push(out_of_range("age", self.age, &AGE_RANGE));
        }
        if !RESTING_BP_RANGE.contains(&self.resting_bp) {
            errors.push(out_of_range("resting blood pressure", self.resting_bp, &RESTING_BP_RANGE));
        }
        if !CHOLESTEROL_RANGE.contains(&self.cholesterol) {
            errors.push(out_of_range("cholesterol", self.cholesterol, &CHOLESTEROL_RANGE));
        }
        if !MAX_HEART_RATE_RANGE.contains(&self.max_heart_rate) {
            errors.push(out_of_range("max heart rate", self.max_heart_rate, &MAX_HEART_RATE_RANGE));
        }
        if !OLDPEAK_RANGE.contains(&self.oldpeak) {
            errors.push(out_of_range("oldpeak", self.oldpeak, &OLDPEAK_RANGE));
        }
        if !MAJOR_VESSELS_RANGE.contains(&self.major_vessels) {
            errors.push(out_of_range("major vessels", self.major_vessels, &MAJOR_VESSELS_RANGE));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn out_of_range<T: std::fmt::Display>(field: &str, value: T, range: &RangeInclusive<T>) -> String {
    format!(
        "{field} {value} out of range [{}, {}]",
        range.start(),
        range.end()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PatientRecord {
        PatientRecord {
            age: 63,
            sex: "male".to_string(),
            chest_pain: "Typical angina".to_string(),
            resting_bp: 145,
            resting_ecg: "Nothing to note".to_string(),
            cholesterol: 233,
            fasting_blood_sugar: "Yes".to_string(),
            max_heart_rate: 150,
            exercise_angina: "No".to_string(),
            oldpeak: 2.3,
            slope: "Upsloping: better heart rate with exercise (uncommon)".to_string(),
            major_vessels: 0,
            thalassemia: "fixed defect: used to be defect but ok now".to_string(),
        }
    }

    #[test]
    fn valid_record_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn violations_are_collected() {
        let mut record = sample();
        record.age = 0;
        record.resting_bp = 700;
        let errors = record.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("age"));
        assert!(errors[1].contains("resting blood pressure"));
    }

    #[test]
    fn domain_edges_are_inclusive() {
        let mut record = sample();
        record.age = 120;
        record.major_vessels = 4;
        record.oldpeak = 10.0;
        assert!(record.validate().is_ok());
    }
}
