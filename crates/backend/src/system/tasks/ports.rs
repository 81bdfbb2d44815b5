use async_trait::async_trait;
use contracts::domain::a001_device::aggregate::{Device, DeviceId};
use contracts::domain::a002_operator::aggregate::Operator;
use contracts::domain::a003_supervisor::aggregate::Supervisor;
use contracts::domain::a004_alert::aggregate::Alert;
use contracts::domain::a004_alert::request::AlertDraft;
use contracts::domain::a005_report::aggregate::Report;
use contracts::domain::a005_report::request::ReportDraft;
use contracts::enums::task_kind::TaskKind;
use contracts::projections::p001_energy_consumption::dto::EnergyConsumptionDto;
use contracts::system::tasks::aggregate::ScheduledTask;

use super::error::TaskError;

// ============================================================================
// Хранилище заданий
// ============================================================================

/// Хранилище регламентных заданий — источник истины
///
/// Рантайм держит только кеш; актуальное состояние задания всегда
/// перечитывается отсюда.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<ScheduledTask>, TaskError>;

    async fn list_by_kind(&self, kind: TaskKind) -> Result<Vec<ScheduledTask>, TaskError>;

    async fn get_by_public_id(&self, public_id: &str) -> Result<Option<ScheduledTask>, TaskError>;

    async fn insert(&self, task: &ScheduledTask) -> Result<(), TaskError>;

    async fn update(&self, task: &ScheduledTask) -> Result<(), TaskError>;

    /// Толерантное удаление: отсутствующая запись — это `Ok(None)`,
    /// а не ошибка
    async fn delete_by_public_id(
        &self,
        public_id: &str,
    ) -> Result<Option<ScheduledTask>, TaskError>;
}

// ============================================================================
// Рантайм фоновых заданий
// ============================================================================

/// Решение обработчика по итогам одного срабатывания
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    /// Оставить регистрацию, ждать следующего срабатывания
    Reschedule,
    /// Снять регистрацию навсегда
    Expire,
}

/// Обработчик срабатывания, вызывается рантаймом по таймеру
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn on_fire(&self, key: &str) -> FireDecision;
}

/// Рантайм периодических заданий: "дергай обработчик с этим ключом
/// каждые N миллисекунд, начиная прямо сейчас"
#[async_trait]
pub trait JobRuntime: Send + Sync {
    /// Зарегистрировать периодическое срабатывание
    ///
    /// Повторная регистрация существующего ключа заменяет старую —
    /// create/update идемпотентны относительно рантайма. `payload` —
    /// кеш атрибутов задания на момент регистрации, не источник истины.
    async fn schedule(
        &self,
        key: &str,
        interval_ms: i64,
        payload: ScheduledTask,
    ) -> Result<(), TaskError>;

    /// Снять регистрацию; `true` — если она существовала
    async fn cancel(&self, key: &str) -> Result<bool, TaskError>;

    /// Зарегистрирован ли ключ
    async fn is_scheduled(&self, key: &str) -> bool;
}

// ============================================================================
// Побочные эффекты срабатываний
// ============================================================================

/// Сервис оповещений
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn create_alert(&self, draft: AlertDraft) -> anyhow::Result<Alert>;
}

/// Регистр потребления: создание синтетического замера
///
/// Значение замера генерирует сам регистр.
#[async_trait]
pub trait MeasurementSink: Send + Sync {
    async fn record_consumption(&self, device_id: DeviceId)
        -> anyhow::Result<EnergyConsumptionDto>;
}

/// Сервис отчетов
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn create_report(&self, draft: ReportDraft) -> anyhow::Result<Report>;
}

// ============================================================================
// Справочник ссылок
// ============================================================================

/// Разрешение внешних ссылок запроса: устройство по имени,
/// владелец по email
#[async_trait]
pub trait Directory: Send + Sync {
    async fn device_by_name(&self, name: &str) -> Result<Option<Device>, TaskError>;

    async fn operator_by_email(&self, email: &str) -> Result<Option<Operator>, TaskError>;

    async fn supervisor_by_email(&self, email: &str) -> Result<Option<Supervisor>, TaskError>;
}
