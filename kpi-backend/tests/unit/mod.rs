// tests/unit/mod.rs
mod assignment_rollup_tests;
mod audit_log_tests;
mod reassignment_tests;
mod snapshot_tests;
