use crate::models::bmi::{BmiCategory, BmiReading, SeverityTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BmiError {
    #[error("Invalid input for BMI calculation.")]
    InvalidInput,
}

/// Compute BMI from weight (kg) and height (cm) and classify it.
///
/// Thresholds are lower-bound inclusive and applied to the unrounded value:
/// below 18.5 underweight, below 25 normal, below 30 overweight, else obese.
/// Zero, negative or non-finite inputs yield `BmiError::InvalidInput`.
pub fn classify(weight_kg: f64, height_cm: f64) -> Result<BmiReading, BmiError> {
    if !(weight_kg.is_finite() && weight_kg > 0.0) || !(height_cm.is_finite() && height_cm > 0.0) {
        return Err(BmiError::InvalidInput);
    }

    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    if !bmi.is_finite() {
        return Err(BmiError::InvalidInput);
    }

    let (category, severity) = if bmi < 18.5 {
        (BmiCategory::Underweight, SeverityTag::Underweight)
    } else if bmi < 25.0 {
        (BmiCategory::Normal, SeverityTag::Healthy)
    } else if bmi < 30.0 {
        (BmiCategory::Overweight, SeverityTag::Overweight)
    } else {
        (BmiCategory::Obese, SeverityTag::Overweight)
    };

    Ok(BmiReading {
        bmi: round_tenths(bmi)?,
        category,
        label: category.label(),
        severity,
    })
}

/// Round to one decimal place from the exact binary value, ties to even:
/// 20.25 reads 20.2, while 20.35 (stored just above) reads 20.4.
fn round_tenths(value: f64) -> Result<f64, BmiError> {
    format!("{value:.1}")
        .parse()
        .map_err(|_| BmiError::InvalidInput)
}

/// Prompt sent to the advice service after a successful reading.
pub fn tips_prompt(reading: &BmiReading) -> String {
    format!(
        "A child has a BMI of {}. Suggest healthy diet and exercise tips.",
        reading.bmi
    )
}
