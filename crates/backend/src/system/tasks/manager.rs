use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use contracts::enums::task_kind::TaskKind;
use contracts::system::tasks::aggregate::{ScheduledTask, TaskDetails};
use contracts::system::tasks::request::{CreateTaskDto, UpdateTaskDto};

use super::error::TaskError;

/// Профильный менеджер вида регламентного задания
///
/// Менеджер владеет всем, что специфично для вида: проверкой
/// обязательных полей, отображением wire-полей в поля вида, частичным
/// обновлением и действием при срабатывании. Общий CRUD-клей
/// (разрешение ссылок, сохранение, регистрация в рантайме) живет в
/// диспетчере и менеджеров не касается.
#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Вид задания, который обслуживает менеджер
    fn kind(&self) -> TaskKind;

    /// Проверить обязательные поля вида
    ///
    /// Ошибка называет отсутствующее поле; ничего не конструируется
    /// и не сохраняется.
    fn check_attributes(&self, dto: &CreateTaskDto) -> Result<(), TaskError>;

    /// Построить поля вида из запроса на создание
    fn build_details(&self, dto: &CreateTaskDto) -> Result<TaskDetails, TaskError>;

    /// Частично обновить поля вида
    ///
    /// Отсутствующее в запросе поле не трогает сохраненное значение.
    fn apply_update(
        &self,
        details: &mut TaskDetails,
        dto: &UpdateTaskDto,
    ) -> Result<(), TaskError>;

    /// Действие при срабатывании задания
    async fn tick(&self, task: &ScheduledTask) -> anyhow::Result<()>;
}

/// Разбор wire-даты "YYYY-MM-DD" в полночь UTC
pub(crate) fn parse_wire_date(field: &str, value: &str) -> Result<DateTime<Utc>, TaskError> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| TaskError::validation(format!("invalid date in field {}: {}", field, value)))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| TaskError::validation(format!("invalid date in field {}: {}", field, value)))?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_wire_date() {
        let parsed = parse_wire_date("startDate", "2024-05-01").unwrap();
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.month(), 5);
        assert_eq!(parsed.day(), 1);
    }

    #[test]
    fn test_parse_wire_date_rejects_garbage() {
        assert!(parse_wire_date("startDate", "01.05.2024").is_err());
        assert!(parse_wire_date("startDate", "not-a-date").is_err());
        assert!(parse_wire_date("startDate", "2024-13-40").is_err());
    }
}
