use crate::domain::a001_device::aggregate::DeviceId;
use crate::domain::a002_operator::aggregate::OperatorId;
use crate::domain::a003_supervisor::aggregate::SupervisorId;
use crate::enums::report_type::ReportType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Заявка на формирование отчета
///
/// Итоговые показатели отчета сервис считает сам по регистру
/// потребления; задание передает только параметры периода.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDraft {
    #[serde(rename = "reportType")]
    pub report_type: ReportType,

    pub title: String,

    #[serde(rename = "startReportDate")]
    pub start_report_date: DateTime<Utc>,

    #[serde(rename = "endReportDate")]
    pub end_report_date: DateTime<Utc>,

    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,

    #[serde(rename = "operatorId")]
    pub operator_id: Option<OperatorId>,

    #[serde(rename = "supervisorId")]
    pub supervisor_id: Option<SupervisorId>,

    /// Порог аномалии (только для отчетов по аномалиям)
    pub threshold: Option<f64>,
}
