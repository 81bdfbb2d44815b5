use serde::{Deserialize, Serialize};

/// Типы оповещений
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// Требуется техобслуживание устройства
    Maintenance,
    /// Нетипичное потребление энергии
    UnusualConsumption,
}

impl AlertType {
    pub fn code(&self) -> &'static str {
        match self {
            AlertType::Maintenance => "MAINTENANCE",
            AlertType::UnusualConsumption => "UNUSUAL_CONSUMPTION",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "MAINTENANCE" => Some(AlertType::Maintenance),
            "UNUSUAL_CONSUMPTION" => Some(AlertType::UnusualConsumption),
            _ => None,
        }
    }
}
