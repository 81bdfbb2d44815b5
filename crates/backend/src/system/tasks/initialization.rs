use async_trait::async_trait;
use contracts::domain::a001_device::aggregate::{Device, DeviceId};
use contracts::domain::a002_operator::aggregate::Operator;
use contracts::domain::a003_supervisor::aggregate::Supervisor;
use contracts::domain::a004_alert::aggregate::Alert;
use contracts::domain::a004_alert::request::AlertDraft;
use contracts::domain::a005_report::aggregate::Report;
use contracts::domain::a005_report::request::ReportDraft;
use contracts::projections::p001_energy_consumption::dto::EnergyConsumptionDto;
use std::sync::Arc;
use tracing::info;

use crate::shared::config::Config;
use crate::shared::data::db::get_connection;

use super::error::TaskError;
use super::logger::TaskLogger;
use super::managers::{
    GenerateAnomaliesReportManager, GenerateConsumptionReportManager, MaintenanceDeviceManager,
    MonitorizeConsumptionManager,
};
use super::ports::{AlertSink, Directory, JobRuntime, MeasurementSink, ReportSink, TaskStore};
use super::registry::TaskManagerRegistry;
use super::repository::SqlTaskStore;
use super::runtime::TokioJobRuntime;
use super::service::TaskDispatchService;
use super::tick::TaskTickHandler;

// ============================================================================
// Адаптеры портов поверх доменных сервисов
// ============================================================================

struct SqlAlertSink;

#[async_trait]
impl AlertSink for SqlAlertSink {
    async fn create_alert(&self, draft: AlertDraft) -> anyhow::Result<Alert> {
        crate::domain::a004_alert::service::create(draft).await
    }
}

struct SqlMeasurementSink;

#[async_trait]
impl MeasurementSink for SqlMeasurementSink {
    async fn record_consumption(
        &self,
        device_id: DeviceId,
    ) -> anyhow::Result<EnergyConsumptionDto> {
        let device = crate::domain::a001_device::service::get_by_id(device_id.0)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Device {} not found", device_id.0))?;
        crate::projections::p001_energy_consumption::service::record_synthetic(&device).await
    }
}

struct SqlReportSink;

#[async_trait]
impl ReportSink for SqlReportSink {
    async fn create_report(&self, draft: ReportDraft) -> anyhow::Result<Report> {
        crate::domain::a005_report::service::create(draft).await
    }
}

struct SqlDirectory;

#[async_trait]
impl Directory for SqlDirectory {
    async fn device_by_name(&self, name: &str) -> Result<Option<Device>, TaskError> {
        Ok(crate::domain::a001_device::repository::get_by_name(name).await?)
    }

    async fn operator_by_email(&self, email: &str) -> Result<Option<Operator>, TaskError> {
        Ok(crate::domain::a002_operator::repository::get_by_email(email).await?)
    }

    async fn supervisor_by_email(&self, email: &str) -> Result<Option<Supervisor>, TaskError> {
        Ok(crate::domain::a003_supervisor::repository::get_by_email(email).await?)
    }
}

// ============================================================================
// Сборка подсистемы
// ============================================================================

/// Собранная подсистема регламентных заданий
pub struct TaskEngine {
    pub service: Arc<TaskDispatchService>,
    pub runtime: Arc<TokioJobRuntime>,
}

/// Инициализирует реестр менеджеров, рантайм и диспетчер, затем
/// восстанавливает регистрации по сохраненным заданиям
///
/// Регистрации рантайма живут только в памяти процесса; источник
/// истины — хранилище, поэтому на старте каждое сохраненное задание
/// регистрируется заново. Задание с давно истекшим сроком выполнит
/// действие один раз и будет снято первым же срабатыванием.
pub async fn initialize_scheduled_tasks(config: &Config) -> anyhow::Result<TaskEngine> {
    let store: Arc<dyn TaskStore> = Arc::new(SqlTaskStore::new(get_connection().clone()));
    let logger = Arc::new(TaskLogger::new(&config.scheduler.log_dir));

    let alerts: Arc<dyn AlertSink> = Arc::new(SqlAlertSink);
    let measurements: Arc<dyn MeasurementSink> = Arc::new(SqlMeasurementSink);
    let reports: Arc<dyn ReportSink> = Arc::new(SqlReportSink);
    let directory: Arc<dyn Directory> = Arc::new(SqlDirectory);

    // Register managers for all four task kinds
    let mut registry = TaskManagerRegistry::new();
    registry.register(GenerateAnomaliesReportManager::new(reports.clone()));
    registry.register(GenerateConsumptionReportManager::new(reports));
    registry.register(MaintenanceDeviceManager::new(alerts.clone()));
    registry.register(MonitorizeConsumptionManager::new(measurements, alerts));
    let registry = Arc::new(registry);

    let handler = Arc::new(TaskTickHandler::new(store.clone(), registry.clone(), logger));
    let runtime = Arc::new(TokioJobRuntime::new(handler));
    let job_runtime: Arc<dyn JobRuntime> = runtime.clone();

    // Восстановление регистраций
    let persisted = store.list_all().await?;
    for task in &persisted {
        job_runtime
            .schedule(task.public_id(), task.refire_interval_ms, task.clone())
            .await?;
    }
    info!("Restored {} job registration(s)", persisted.len());

    let service = Arc::new(TaskDispatchService::new(
        store,
        job_runtime,
        registry,
        directory,
    ));

    Ok(TaskEngine { service, runtime })
}
