use serde::{Deserialize, Serialize};

/// Периодичность повторения регламентного задания
///
/// Интервал перезапуска фиксированный и вычисляется один раз при
/// создании задания; месяц считается как 30 суток без календарной
/// арифметики.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Получить код периодичности
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
        }
    }

    /// Интервал перезапуска в миллисекундах
    pub fn interval_ms(&self) -> i64 {
        match self {
            Frequency::Daily => 86_400_000,
            Frequency::Weekly => 604_800_000,
            // Фиксированные 30 суток
            Frequency::Monthly => 2_592_000_000,
        }
    }

    /// Получить все периодичности
    pub fn all() -> Vec<Frequency> {
        vec![Frequency::Daily, Frequency::Weekly, Frequency::Monthly]
    }

    /// Парсинг из строки
    ///
    /// Неизвестный код — ошибка, никакого значения по умолчанию.
    pub fn from_code(code: &str) -> Result<Self, String> {
        match code {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            other => Err(format!("Invalid frequency: {}", other)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_ms() {
        assert_eq!(Frequency::Daily.interval_ms(), 86_400_000);
        assert_eq!(Frequency::Weekly.interval_ms(), 604_800_000);
        assert_eq!(Frequency::Monthly.interval_ms(), 2_592_000_000);
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Frequency::from_code("DAILY"), Ok(Frequency::Daily));
        assert_eq!(Frequency::from_code("WEEKLY"), Ok(Frequency::Weekly));
        assert_eq!(Frequency::from_code("MONTHLY"), Ok(Frequency::Monthly));
    }

    #[test]
    fn test_from_code_rejects_unknown() {
        assert!(Frequency::from_code("HOURLY").is_err());
        assert!(Frequency::from_code("daily").is_err());
        assert!(Frequency::from_code("").is_err());
    }
}
