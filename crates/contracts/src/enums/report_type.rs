use serde::{Deserialize, Serialize};

/// Типы отчетов, формируемых регламентными заданиями
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    /// Отчет по аномалиям потребления (значения выше порога)
    Anomalies,
    /// Сводный отчет по потреблению
    Consumption,
}

impl ReportType {
    pub fn code(&self) -> &'static str {
        match self {
            ReportType::Anomalies => "ANOMALIES",
            ReportType::Consumption => "CONSUMPTION",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ANOMALIES" => Some(ReportType::Anomalies),
            "CONSUMPTION" => Some(ReportType::Consumption),
            _ => None,
        }
    }
}
