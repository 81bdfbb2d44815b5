use serde::{Deserialize, Serialize};

/// Запрос на создание регламентного задания
///
/// Дискриминатор `type` обязателен — по нему диспетчер выбирает
/// профильный менеджер. Все даты — строки "YYYY-MM-DD".
/// Обязательность остальных полей зависит от вида задания и
/// проверяется менеджером до какого-либо сохранения.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskDto {
    #[serde(rename = "type")]
    pub task_type: String,

    pub description: Option<String>,

    pub start_date: Option<String>,
    pub end_date: Option<String>,

    pub frequency: Option<String>,

    /// Техническое имя целевого устройства
    pub device_name: Option<String>,

    /// Email владельца-оператора (взаимоисключимо с supervisorEmail)
    pub operator_email: Option<String>,

    /// Email владельца-супервизора (взаимоисключимо с operatorEmail)
    pub supervisor_email: Option<String>,

    // Поля отчетных заданий
    pub start_report_date: Option<String>,
    pub end_report_date: Option<String>,
    pub title: Option<String>,

    /// Порог (аномалии / нетипичное потребление)
    pub threshold: Option<f64>,
}

/// Запрос на изменение регламентного задания
///
/// Частичное обновление: отсутствующее поле не трогает сохраненное
/// значение. Дискриминатор `type` необязателен; если указан — обязан
/// совпадать с видом сохраненного задания.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskDto {
    pub public_id: String,

    #[serde(rename = "type")]
    pub task_type: Option<String>,

    pub description: Option<String>,

    pub end_date: Option<String>,

    pub frequency: Option<String>,

    pub start_report_date: Option<String>,
    pub end_report_date: Option<String>,
    pub title: Option<String>,

    pub threshold: Option<f64>,
}
