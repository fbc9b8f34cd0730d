use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Text shown next to the value on the BMI card.
    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal Weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// Display severity; obese readings share the `overweight` styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTag {
    Underweight,
    Healthy,
    Overweight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BmiReading {
    /// Rounded to one decimal.
    pub bmi: f64,
    pub category: BmiCategory,
    pub label: &'static str,
    pub severity: SeverityTag,
}

/// Body for POST /bmi.
#[derive(Debug, Deserialize)]
pub struct BmiRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
    /// Also ask the advice service for diet and exercise tips.
    #[serde(default)]
    pub tips: bool,
}
