use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Youngest and oldest age a plan may be recorded for.
pub const MIN_AGE: u8 = 3;
pub const MAX_AGE: u8 = 18;

/// Calendar day of a weekly plan. Serialized as its English name ("Monday").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayName {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayName {
    /// The fixed order every stored week follows.
    pub const WEEK: [DayName; 7] = [
        DayName::Monday,
        DayName::Tuesday,
        DayName::Wednesday,
        DayName::Thursday,
        DayName::Friday,
        DayName::Saturday,
        DayName::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayName::Monday => "Monday",
            DayName::Tuesday => "Tuesday",
            DayName::Wednesday => "Wednesday",
            DayName::Thursday => "Thursday",
            DayName::Friday => "Friday",
            DayName::Saturday => "Saturday",
            DayName::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four meal slots of a day, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MealField {
    Breakfast,
    Lunch,
    Snack,
    Dinner,
}

impl MealField {
    pub const ALL: [MealField; 4] = [
        MealField::Breakfast,
        MealField::Lunch,
        MealField::Snack,
        MealField::Dinner,
    ];
}

impl fmt::Display for MealField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MealField::Breakfast => "Breakfast",
            MealField::Lunch => "Lunch",
            MealField::Snack => "Snack",
            MealField::Dinner => "Dinner",
        };
        f.write_str(name)
    }
}

/// One day's meals. Field names match the stored record (`{Day, Breakfast, ...}`).
/// An empty string means the meal was not specified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayMeals {
    pub day: DayName,
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub snack: String,
    #[serde(default)]
    pub dinner: String,
}

impl DayMeals {
    pub fn empty(day: DayName) -> Self {
        Self {
            day,
            breakfast: String::new(),
            lunch: String::new(),
            snack: String::new(),
            dinner: String::new(),
        }
    }

    pub fn field(&self, field: MealField) -> &str {
        match field {
            MealField::Breakfast => &self.breakfast,
            MealField::Lunch => &self.lunch,
            MealField::Snack => &self.snack,
            MealField::Dinner => &self.dinner,
        }
    }

    /// Seven empty days, Monday through Sunday.
    pub fn blank_week() -> Vec<DayMeals> {
        DayName::WEEK.iter().copied().map(DayMeals::empty).collect()
    }
}

/// A child's weekly meal plan as stored under `/{collection}/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPlan {
    pub id: String,
    pub child_name: String,
    pub age: u8,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "plan", default)]
    pub days: Vec<DayMeals>,
}

/// A plan that has passed input checks and validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDraft {
    pub child_name: String,
    pub age: u8,
    pub email: String,
    pub days: Vec<DayMeals>,
}

impl PlanDraft {
    pub fn with_id(self, id: String) -> WeeklyPlan {
        WeeklyPlan {
            id,
            child_name: self.child_name,
            age: self.age,
            email: self.email,
            days: self.days,
        }
    }
}

/// List-view entry for a stored plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub child_name: String,
    pub age: u8,
}

impl From<&WeeklyPlan> for PlanSummary {
    fn from(plan: &WeeklyPlan) -> Self {
        Self {
            child_name: plan.child_name.clone(),
            age: plan.age,
        }
    }
}

/// A single meal field that fails the character policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub day: DayName,
    pub field: MealField,
    pub value: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}: '{}'", self.day, self.field, self.value)
    }
}

/// Body for POST /plans.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanRequest {
    pub child_name: String,
    pub age: i64,
    pub email: Option<String>,
    pub days: Vec<DayMeals>,
}

/// Body for PUT /plans/{id} and POST /plans/validate.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlanRequest {
    pub days: Vec<DayMeals>,
}

/// Short opaque id: the first 8 hex characters of a random v4 UUID.
pub fn new_plan_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

/// Whether `id` can name a single record key: non-empty, with no path
/// separators, key-reserved characters (`. # $ [ ]`) or control characters.
pub fn is_valid_plan_id(id: &str) -> bool {
    !id.is_empty()
        && !id
            .chars()
            .any(|c| c.is_control() || matches!(c, '/' | '.' | '#' | '$' | '[' | ']'))
}
