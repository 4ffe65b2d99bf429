//! Translation from intake labels to the numeric codes the classifier was
//! trained on.
//!
//! Each categorical field has one static [`CategoryCodeTable`]; the codes
//! are the ones the persisted model saw during training, so they must never
//! drift. The form derives its options from these tables, which keeps every
//! offered label encodable.

use crate::error::{ForecastError, Result};
use crate::records::PatientRecord;

/// Number of features the classifier consumes.
pub const FEATURE_COUNT: usize = 13;

/// Training column order. The classifier and the scaler bounds were both
/// fitted against columns in exactly this order; reordering produces wrong
/// predictions without any error, so nothing here may be shuffled.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "age", "sex", "cp", "trestbps", "restecg", "chol", "fbs", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Static label-to-code mapping for one categorical intake field.
///
/// Entry order is meaningful: the form renders options in table order.
pub struct CategoryCodeTable {
    /// Intake field the table applies to, as shown in error messages.
    pub field: &'static str,
    entries: &'static [(&'static str, f64)],
}

impl CategoryCodeTable {
    /// Numeric code for `label`. A label missing from the table is an
    /// error, never a silent default.
    pub fn code(&self, label: &str) -> Result<f64> {
        self.entries
            .iter()
            .find(|(known, _)| *known == label)
            .map(|(_, code)| *code)
            .ok_or_else(|| ForecastError::UnknownCategoryLabel {
                field: self.field,
                label: label.to_string(),
            })
    }

    /// Labels in render order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|(label, _)| *label)
    }
}

pub static SEX: CategoryCodeTable = CategoryCodeTable {
    field: "sex",
    entries: &[("male", 1.0), ("female", 0.0)],
};

pub static CHEST_PAIN: CategoryCodeTable = CategoryCodeTable {
    field: "chest pain type",
    entries: &[
        ("Typical angina", 0.0),
        ("Atypical angina", 1.0),
        ("Non-anginal pain", 2.0),
        // shares a code with non-anginal pain in the trained encoding
        ("Asymptomatic", 2.0),
    ],
};

pub static RESTING_ECG: CategoryCodeTable = CategoryCodeTable {
    field: "resting ECG result",
    entries: &[
        ("Nothing to note", 0.0),
        ("ST-T Wave abnormality", 1.0),
        ("Possible or definite enlargement of the left ventricle", 2.0),
    ],
};

pub static FASTING_BLOOD_SUGAR: CategoryCodeTable = CategoryCodeTable {
    field: "fasting blood sugar flag",
    entries: &[("Yes", 1.0), ("No", 0.0)],
};

pub static EXERCISE_ANGINA: CategoryCodeTable = CategoryCodeTable {
    field: "exercise induced angina flag",
    entries: &[("Yes", 1.0), ("No", 0.0)],
};

pub static SLOPE: CategoryCodeTable = CategoryCodeTable {
    field: "heart rate slope",
    entries: &[
        ("Upsloping: better heart rate with exercise (uncommon)", 0.0),
        ("Flatsloping: minimal change (typical healthy heart)", 1.0),
        ("Downsloping: signs of unhealthy heart", 2.0),
    ],
};

pub static THALASSEMIA: CategoryCodeTable = CategoryCodeTable {
    field: "thallium stress result",
    entries: &[
        ("fixed defect: used to be defect but ok now", 6.0),
        ("reversable defect: no proper blood movement when exercising", 7.0),
        // the trained encoding used a non-integral code for "normal"
        ("normal", 2.31),
    ],
};

/// Encode a patient record into the fixed-order feature vector.
///
/// Numeric fields pass through unchanged; categorical fields go through
/// their code table. Deterministic and side-effect free.
pub fn encode(record: &PatientRecord) -> Result<Vec<f64>> {
    Ok(vec![
        f64::from(record.age),
        SEX.code(&record.sex)?,
        CHEST_PAIN.code(&record.chest_pain)?,
        f64::from(record.resting_bp),
        RESTING_ECG.code(&record.resting_ecg)?,
        f64::from(record.cholesterol),
        FASTING_BLOOD_SUGAR.code(&record.fasting_blood_sugar)?,
        f64::from(record.max_heart_rate),
        EXERCISE_ANGINA.code(&record.exercise_angina)?,
        record.oldpeak,
        SLOPE.code(&record.slope)?,
        f64::from(record.major_vessels),
        THALASSEMIA.code(&record.thalassemia)?,
    ])
}
