use crate::domain::a001_device::aggregate::DeviceId;
use crate::domain::a002_operator::aggregate::OperatorId;
use crate::domain::a003_supervisor::aggregate::SupervisorId;
use crate::domain::common::{
    AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, EventStore, Origin,
};
use crate::enums::frequency::Frequency;
use crate::enums::task_kind::TaskKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор регламентного задания
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledTaskId(pub Uuid);

impl ScheduledTaskId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ScheduledTaskId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ScheduledTaskId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Владелец задания
// ============================================================================

/// Владелец регламентного задания
///
/// Задание всегда принадлежит ровно одному сотруднику: оператору или
/// супервизору. Инвариант несет сам тип — сконструировать задание без
/// владельца (или с двумя) невозможно.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "camelCase")]
pub enum TaskAssignee {
    Operator(OperatorId),
    Supervisor(SupervisorId),
}

impl TaskAssignee {
    pub fn operator_id(&self) -> Option<OperatorId> {
        match self {
            TaskAssignee::Operator(id) => Some(*id),
            TaskAssignee::Supervisor(_) => None,
        }
    }

    pub fn supervisor_id(&self) -> Option<SupervisorId> {
        match self {
            TaskAssignee::Operator(_) => None,
            TaskAssignee::Supervisor(id) => Some(*id),
        }
    }
}

// ============================================================================
// Kind-specific поля
// ============================================================================

/// Поля, специфичные для вида задания
///
/// Закрытая сумма вместо иерархии наследования: проверка полноты
/// обработчиков по видам выполняется компилятором.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TaskDetails {
    #[serde(rename = "GENERATE_ANOMALIES_REPORT")]
    GenerateAnomaliesReport {
        #[serde(rename = "startReportDate")]
        start_report_date: DateTime<Utc>,
        #[serde(rename = "endReportDate")]
        end_report_date: DateTime<Utc>,
        title: String,
        /// Порог аномалии, кВт·ч
        threshold: f64,
    },
    #[serde(rename = "GENERATE_CONSUMPTION_REPORT")]
    GenerateConsumptionReport {
        #[serde(rename = "startReportDate")]
        start_report_date: DateTime<Utc>,
        #[serde(rename = "endReportDate")]
        end_report_date: DateTime<Utc>,
        title: String,
    },
    #[serde(rename = "MAINTENANCE_DEVICE")]
    MaintenanceDevice,
    #[serde(rename = "MONITORIZE_CONSUMPTION")]
    MonitorizeConsumption {
        /// Порог нетипичного потребления, кВт·ч
        threshold: f64,
    },
}

impl TaskDetails {
    /// Вид задания по варианту
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskDetails::GenerateAnomaliesReport { .. } => TaskKind::GenerateAnomaliesReport,
            TaskDetails::GenerateConsumptionReport { .. } => TaskKind::GenerateConsumptionReport,
            TaskDetails::MaintenanceDevice => TaskKind::MaintenanceDevice,
            TaskDetails::MonitorizeConsumption { .. } => TaskKind::MonitorizeConsumption,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Регламентное задание (Scheduled Task)
///
/// Периодически срабатывающее задание, привязанное к одному устройству
/// и одному владельцу. Публичный идентификатор — `base.code`
/// ("TSK-xxxxxxxx"); интервал перезапуска вычисляется из периодичности
/// один раз при конструировании и кешируется.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    #[serde(flatten)]
    pub base: BaseAggregate<ScheduledTaskId>,

    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,

    /// Владелец (ровно один)
    pub assignee: TaskAssignee,

    pub frequency: Frequency,

    /// Интервал перезапуска, мс (кеш от `frequency`)
    #[serde(rename = "refireIntervalMs")]
    pub refire_interval_ms: i64,

    /// Дата начала действия
    #[serde(rename = "startDate")]
    pub start_date: DateTime<Utc>,

    /// Дата окончания действия; None — задание бессрочное
    #[serde(rename = "endDate")]
    pub end_date: Option<DateTime<Utc>>,

    /// Поля конкретного вида
    pub details: TaskDetails,
}

impl ScheduledTask {
    /// Создать новое задание для вставки в БД
    ///
    /// Здесь — единственное место, где периодичность превращается
    /// в интервал; обработчик срабатываний его не пересчитывает.
    pub fn new_for_insert(
        description: String,
        device_id: DeviceId,
        assignee: TaskAssignee,
        frequency: Frequency,
        start_date: DateTime<Utc>,
        end_date: Option<DateTime<Utc>>,
        details: TaskDetails,
    ) -> Self {
        let id = ScheduledTaskId::new_v4();
        let code = format!("TSK-{}", &id.0.simple().to_string()[..8]);
        let refire_interval_ms = frequency.interval_ms();

        Self {
            base: BaseAggregate::new(id, code, description),
            device_id,
            assignee,
            frequency,
            refire_interval_ms,
            start_date,
            end_date,
            details,
        }
    }

    /// Вид задания
    pub fn kind(&self) -> TaskKind {
        self.details.kind()
    }

    /// Публичный идентификатор задания
    pub fn public_id(&self) -> &str {
        &self.base.code
    }

    /// Истекло ли задание к моменту `now`
    ///
    /// Бессрочное задание (без даты окончания) не истекает никогда.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.end_date {
            Some(end) => end <= now,
            None => false,
        }
    }

    /// Сменить периодичность с пересчетом интервала
    pub fn set_frequency(&mut self, frequency: Frequency) {
        self.frequency = frequency;
        self.refire_interval_ms = frequency.interval_ms();
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Описание задания не может быть пустым".into());
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err("Дата окончания раньше даты начала".into());
            }
        }
        match &self.details {
            TaskDetails::GenerateAnomaliesReport {
                start_report_date,
                end_report_date,
                title,
                threshold,
            } => {
                if title.trim().is_empty() {
                    return Err("Заголовок отчета не может быть пустым".into());
                }
                if end_report_date < start_report_date {
                    return Err("Конец отчетного периода раньше его начала".into());
                }
                if !threshold.is_finite() {
                    return Err("Порог аномалии должен быть числом".into());
                }
            }
            TaskDetails::GenerateConsumptionReport {
                start_report_date,
                end_report_date,
                title,
            } => {
                if title.trim().is_empty() {
                    return Err("Заголовок отчета не может быть пустым".into());
                }
                if end_report_date < start_report_date {
                    return Err("Конец отчетного периода раньше его начала".into());
                }
            }
            TaskDetails::MaintenanceDevice => {}
            TaskDetails::MonitorizeConsumption { threshold } => {
                if !threshold.is_finite() {
                    return Err("Порог потребления должен быть числом".into());
                }
            }
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for ScheduledTask {
    type Id = ScheduledTaskId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn events(&self) -> &EventStore {
        &self.base.events
    }

    fn events_mut(&mut self) -> &mut EventStore {
        &mut self.base.events
    }

    fn aggregate_index() -> &'static str {
        "sys_task"
    }

    fn collection_name() -> &'static str {
        "sys_tasks"
    }

    fn element_name() -> &'static str {
        "Регламентное задание"
    }

    fn list_name() -> &'static str {
        "Регламентные задания"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task(end_date: Option<DateTime<Utc>>) -> ScheduledTask {
        ScheduledTask::new_for_insert(
            "Мониторинг".into(),
            DeviceId::new_v4(),
            TaskAssignee::Operator(OperatorId::new_v4()),
            Frequency::Daily,
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            end_date,
            TaskDetails::MonitorizeConsumption { threshold: 5.0 },
        )
    }

    #[test]
    fn test_interval_is_cached_from_frequency() {
        let task = sample_task(None);
        assert_eq!(task.refire_interval_ms, 86_400_000);

        let mut task = task;
        task.set_frequency(Frequency::Monthly);
        assert_eq!(task.refire_interval_ms, 2_592_000_000);
    }

    #[test]
    fn test_kind_follows_details() {
        let task = sample_task(None);
        assert_eq!(task.kind(), TaskKind::MonitorizeConsumption);
    }

    #[test]
    fn test_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();

        let endless = sample_task(None);
        assert!(!endless.is_expired_at(now));

        let past = sample_task(Some(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()));
        // Дата окончания, равная "сейчас", уже считается истекшей
        assert!(past.is_expired_at(now));

        let future = sample_task(Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()));
        assert!(!future.is_expired_at(now));
    }

    #[test]
    fn test_validate_rejects_inverted_report_window() {
        let mut task = sample_task(None);
        task.details = TaskDetails::GenerateAnomaliesReport {
            start_report_date: Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap(),
            end_report_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            title: "Report 1".into(),
            threshold: 5.0,
        };
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_public_id_is_stable_code() {
        let task = sample_task(None);
        assert!(task.public_id().starts_with("TSK-"));
        assert_eq!(task.public_id(), task.base.code);
    }
}
