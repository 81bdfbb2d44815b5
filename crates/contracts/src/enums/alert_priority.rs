use serde::{Deserialize, Serialize};

/// Приоритет оповещения
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
}

impl AlertPriority {
    pub fn code(&self) -> &'static str {
        match self {
            AlertPriority::Low => "LOW",
            AlertPriority::Medium => "MEDIUM",
            AlertPriority::High => "HIGH",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "LOW" => Some(AlertPriority::Low),
            "MEDIUM" => Some(AlertPriority::Medium),
            "HIGH" => Some(AlertPriority::High),
            _ => None,
        }
    }
}
