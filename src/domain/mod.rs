// Domain layer - Data shapes and pure rules
pub mod dashboard;
pub mod envelope;
pub mod environment;
pub mod metrics;
