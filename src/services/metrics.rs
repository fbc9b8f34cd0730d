use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    // ── Event counters (increment on each event) ────────────────────────────
    pub static ref PLAN_WRITES_COUNTER: CounterVec = register_counter_vec!(
        "api_plan_writes_total",
        "Weekly plan writes by operation and outcome",
        &["operation", "outcome"]
    ).unwrap();

    pub static ref BMI_COUNTER: CounterVec = register_counter_vec!(
        "api_bmi_calculations_total",
        "BMI calculations by resulting category",
        &["category"]
    ).unwrap();

    pub static ref ADVICE_COUNTER: CounterVec = register_counter_vec!(
        "api_advice_requests_total",
        "Calls to the advice service by outcome",
        &["outcome"]
    ).unwrap();
}

/// Record the outcome of a create/update/delete.
pub fn record_write(operation: &str, outcome: &str) {
    PLAN_WRITES_COUNTER
        .with_label_values(&[operation, outcome])
        .inc();
}
