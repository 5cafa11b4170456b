pub mod approval;
pub mod definition;
pub mod readiness;
