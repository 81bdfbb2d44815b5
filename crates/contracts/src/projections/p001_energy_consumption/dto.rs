use serde::{Deserialize, Serialize};

/// Запись регистра энергопотребления (P001)
///
/// Плоская строка регистра: либо фактический замер телеметрии, либо
/// синтетический замер, порожденный заданием мониторинга.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConsumptionDto {
    pub id: String,

    // Dimensions
    pub device_ref: String,
    pub measured_at: chrono::DateTime<chrono::Utc>,

    // Values
    pub value_kwh: f64,

    // Info fields
    /// Синтетический замер (создан заданием мониторинга)
    pub synthetic: bool,
}

/// Запрос на получение записей регистра с фильтрами
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConsumptionListRequest {
    #[serde(default)]
    pub device_ref: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    1000
}
