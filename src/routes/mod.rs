pub mod advice;
pub mod bmi;
pub mod chat;
pub mod health;
pub mod metrics;
pub mod plans;

#[cfg(test)]
pub(crate) mod test_support;
