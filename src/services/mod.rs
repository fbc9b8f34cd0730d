pub mod advice;
pub mod bmi;
pub mod chat;
pub mod metrics;
pub mod plans;
pub mod validation;
