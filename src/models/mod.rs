pub mod bmi;
pub mod chat;
pub mod plan;
