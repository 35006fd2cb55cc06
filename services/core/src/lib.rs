pub mod ddb;
pub mod operation_error;
pub mod telemetry;
