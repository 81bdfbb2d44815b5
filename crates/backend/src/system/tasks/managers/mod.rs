pub mod anomalies_report;
pub mod consumption_monitor;
pub mod consumption_report;
pub mod device_maintenance;

pub use anomalies_report::GenerateAnomaliesReportManager;
pub use consumption_monitor::MonitorizeConsumptionManager;
pub use consumption_report::GenerateConsumptionReportManager;
pub use device_maintenance::MaintenanceDeviceManager;
