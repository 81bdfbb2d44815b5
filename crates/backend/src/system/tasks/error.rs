use thiserror::Error;

/// Ошибки подсистемы регламентных заданий
///
/// Вызывающий слой различает ошибки по варианту; текст — для логов
/// и диагностики.
#[derive(Debug, Error)]
pub enum TaskError {
    /// В запросе не хватает обязательного поля или поле некорректно;
    /// ничего не сохранено и не зарегистрировано
    #[error("validation failed: {0}")]
    Validation(String),

    /// Дискриминатор вида не соответствует ни одному менеджеру
    #[error("unsupported task kind: {0}")]
    UnsupportedKind(String),

    /// Неизвестный код периодичности; значения по умолчанию нет
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// Задание с таким публичным идентификатором не найдено
    #[error("scheduled task not found: {0}")]
    NotFound(String),

    /// Ошибка хранилища
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl TaskError {
    pub fn validation(msg: impl Into<String>) -> Self {
        TaskError::Validation(msg.into())
    }

    pub fn missing_field(field: &str) -> Self {
        TaskError::Validation(format!("missing required field: {}", field))
    }
}
