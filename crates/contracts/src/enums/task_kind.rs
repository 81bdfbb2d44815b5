use serde::{Deserialize, Serialize};

/// Виды регламентных заданий
///
/// Закрытый набор: диспетчер маршрутизирует запросы строго по этому
/// дискриминатору.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    GenerateAnomaliesReport,
    GenerateConsumptionReport,
    MaintenanceDevice,
    MonitorizeConsumption,
}

impl TaskKind {
    /// Получить код вида задания
    pub fn code(&self) -> &'static str {
        match self {
            TaskKind::GenerateAnomaliesReport => "GENERATE_ANOMALIES_REPORT",
            TaskKind::GenerateConsumptionReport => "GENERATE_CONSUMPTION_REPORT",
            TaskKind::MaintenanceDevice => "MAINTENANCE_DEVICE",
            TaskKind::MonitorizeConsumption => "MONITORIZE_CONSUMPTION",
        }
    }

    /// Получить человекочитаемое название
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskKind::GenerateAnomaliesReport => "Отчет по аномалиям потребления",
            TaskKind::GenerateConsumptionReport => "Отчет по потреблению",
            TaskKind::MaintenanceDevice => "Напоминание о техобслуживании",
            TaskKind::MonitorizeConsumption => "Мониторинг потребления",
        }
    }

    /// Получить все виды заданий
    pub fn all() -> Vec<TaskKind> {
        vec![
            TaskKind::GenerateAnomaliesReport,
            TaskKind::GenerateConsumptionReport,
            TaskKind::MaintenanceDevice,
            TaskKind::MonitorizeConsumption,
        ]
    }

    /// Парсинг из строки
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "GENERATE_ANOMALIES_REPORT" => Some(TaskKind::GenerateAnomaliesReport),
            "GENERATE_CONSUMPTION_REPORT" => Some(TaskKind::GenerateConsumptionReport),
            "MAINTENANCE_DEVICE" => Some(TaskKind::MaintenanceDevice),
            "MONITORIZE_CONSUMPTION" => Some(TaskKind::MonitorizeConsumption),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
