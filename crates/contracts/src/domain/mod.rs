pub mod common;

pub mod a001_device;
pub mod a002_operator;
pub mod a003_supervisor;
pub mod a004_alert;
pub mod a005_report;
