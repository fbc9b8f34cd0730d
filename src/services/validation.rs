use crate::models::plan::{DayMeals, DayName, MealField, Violation};

/// Character policy for meal names: after trimming, the text is either empty
/// or made only of ASCII letters (`A-Z`, `a-z`) and whitespace. Digits,
/// punctuation, symbols and non-ASCII letters are rejected.
pub fn is_valid_field(text: &str) -> bool {
    text.trim()
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
}

/// Every meal field that fails [`is_valid_field`], in day order then
/// breakfast, lunch, snack, dinner. Empty when the plan can be written.
pub fn validate_plan(days: &[DayMeals]) -> Vec<Violation> {
    days.iter()
        .flat_map(|day| {
            MealField::ALL.into_iter().filter_map(move |field| {
                let value = day.field(field);
                (!is_valid_field(value)).then(|| Violation {
                    day: day.day,
                    field,
                    value: value.to_string(),
                })
            })
        })
        .collect()
}

/// True when `days` lists Monday through Sunday exactly once, in order.
pub fn is_full_week(days: &[DayMeals]) -> bool {
    days.len() == DayName::WEEK.len()
        && days.iter().zip(DayName::WEEK).all(|(meals, day)| meals.day == day)
}
