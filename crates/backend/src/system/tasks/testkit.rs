//! Тестовые дублеры портов подсистемы регламентных заданий

use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_device::aggregate::{Device, DeviceId};
use contracts::domain::a002_operator::aggregate::Operator;
use contracts::domain::a003_supervisor::aggregate::Supervisor;
use contracts::domain::a004_alert::aggregate::Alert;
use contracts::domain::a004_alert::request::AlertDraft;
use contracts::domain::a005_report::aggregate::Report;
use contracts::domain::a005_report::request::ReportDraft;
use contracts::enums::task_kind::TaskKind;
use contracts::projections::p001_energy_consumption::dto::EnergyConsumptionDto;
use contracts::system::tasks::aggregate::{ScheduledTask, TaskDetails};
use contracts::system::tasks::request::{CreateTaskDto, UpdateTaskDto};
use sea_orm::DbErr;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use super::error::TaskError;
use super::manager::TaskManager;
use super::ports::{
    AlertSink, Directory, JobRuntime, MeasurementSink, ReportSink, TaskStore,
};

// ============================================================================
// Хранилище в памяти
// ============================================================================

#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: Mutex<Vec<ScheduledTask>>,
    fail_reads: AtomicBool,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(task: ScheduledTask) -> Self {
        let store = Self::default();
        store.tasks.lock().unwrap().push(task);
        store
    }

    /// Эмулировать отказ хранилища на чтениях
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn task_count(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    fn read_guard(&self) -> Result<(), TaskError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TaskError::Database(DbErr::Custom(
                "simulated read failure".into(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list_all(&self) -> Result<Vec<ScheduledTask>, TaskError> {
        self.read_guard()?;
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn list_by_kind(&self, kind: TaskKind) -> Result<Vec<ScheduledTask>, TaskError> {
        self.read_guard()?;
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.kind() == kind)
            .cloned()
            .collect())
    }

    async fn get_by_public_id(
        &self,
        public_id: &str,
    ) -> Result<Option<ScheduledTask>, TaskError> {
        self.read_guard()?;
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.public_id() == public_id)
            .cloned())
    }

    async fn insert(&self, task: &ScheduledTask) -> Result<(), TaskError> {
        self.tasks.lock().unwrap().push(task.clone());
        Ok(())
    }

    async fn update(&self, task: &ScheduledTask) -> Result<(), TaskError> {
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.iter_mut().find(|t| t.base.id == task.base.id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(())
            }
            None => Err(TaskError::NotFound(task.public_id().to_string())),
        }
    }

    async fn delete_by_public_id(
        &self,
        public_id: &str,
    ) -> Result<Option<ScheduledTask>, TaskError> {
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.iter().position(|t| t.public_id() == public_id) {
            Some(index) => Ok(Some(tasks.remove(index))),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Рантайм-регистратор
// ============================================================================

#[derive(Default)]
pub struct RecordingJobRuntime {
    pub scheduled: Mutex<Vec<(String, i64)>>,
    pub cancelled: Mutex<Vec<String>>,
    active: Mutex<HashSet<String>>,
}

impl RecordingJobRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_count(&self) -> usize {
        self.scheduled.lock().unwrap().len()
    }

    pub fn last_scheduled(&self) -> Option<(String, i64)> {
        self.scheduled.lock().unwrap().last().cloned()
    }

    pub fn cancelled_keys(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobRuntime for RecordingJobRuntime {
    async fn schedule(
        &self,
        key: &str,
        interval_ms: i64,
        _payload: ScheduledTask,
    ) -> Result<(), TaskError> {
        self.scheduled
            .lock()
            .unwrap()
            .push((key.to_string(), interval_ms));
        self.active.lock().unwrap().insert(key.to_string());
        Ok(())
    }

    async fn cancel(&self, key: &str) -> Result<bool, TaskError> {
        self.cancelled.lock().unwrap().push(key.to_string());
        Ok(self.active.lock().unwrap().remove(key))
    }

    async fn is_scheduled(&self, key: &str) -> bool {
        self.active.lock().unwrap().contains(key)
    }
}

// ============================================================================
// Стоки побочных эффектов
// ============================================================================

#[derive(Default)]
pub struct RecordingAlertSink {
    pub drafts: Mutex<Vec<AlertDraft>>,
    fail: AtomicBool,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Эмулировать отказ сервиса оповещений
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn draft_count(&self) -> usize {
        self.drafts.lock().unwrap().len()
    }
}

#[async_trait]
impl AlertSink for RecordingAlertSink {
    async fn create_alert(&self, draft: AlertDraft) -> anyhow::Result<Alert> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("simulated alert service failure");
        }
        let alert = Alert::new_for_insert(
            "ALR-test".into(),
            draft.message.clone(),
            draft.alert_type,
            draft.priority,
            draft.device_id,
            draft.operator_id,
            draft.supervisor_id,
        );
        self.drafts.lock().unwrap().push(draft);
        Ok(alert)
    }
}

pub struct FixedMeasurementSink {
    value_kwh: f64,
    calls: AtomicU32,
    fail: AtomicBool,
}

impl FixedMeasurementSink {
    pub fn new(value_kwh: f64) -> Self {
        Self {
            value_kwh,
            calls: AtomicU32::new(0),
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MeasurementSink for FixedMeasurementSink {
    async fn record_consumption(
        &self,
        device_id: DeviceId,
    ) -> anyhow::Result<EnergyConsumptionDto> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("simulated measurement service failure");
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EnergyConsumptionDto {
            id: uuid::Uuid::new_v4().to_string(),
            device_ref: device_id.0.to_string(),
            measured_at: Utc::now(),
            value_kwh: self.value_kwh,
            synthetic: true,
        })
    }
}

#[derive(Default)]
pub struct RecordingReportSink {
    pub drafts: Mutex<Vec<ReportDraft>>,
}

impl RecordingReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft_count(&self) -> usize {
        self.drafts.lock().unwrap().len()
    }
}

#[async_trait]
impl ReportSink for RecordingReportSink {
    async fn create_report(&self, draft: ReportDraft) -> anyhow::Result<Report> {
        let report = Report::new_for_insert(
            "RPT-test".into(),
            draft.report_type,
            draft.title.clone(),
            draft.start_report_date,
            draft.end_report_date,
            draft.device_id,
            draft.operator_id,
            draft.supervisor_id,
            draft.threshold,
        );
        self.drafts.lock().unwrap().push(draft);
        Ok(report)
    }
}

// ============================================================================
// Статический справочник
// ============================================================================

#[derive(Default)]
pub struct StaticDirectory {
    pub devices: Vec<Device>,
    pub operators: Vec<Operator>,
    pub supervisors: Vec<Supervisor>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.devices.push(device);
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operators.push(operator);
        self
    }

    pub fn with_supervisor(mut self, supervisor: Supervisor) -> Self {
        self.supervisors.push(supervisor);
        self
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn device_by_name(&self, name: &str) -> Result<Option<Device>, TaskError> {
        Ok(self.devices.iter().find(|d| d.name == name).cloned())
    }

    async fn operator_by_email(&self, email: &str) -> Result<Option<Operator>, TaskError> {
        Ok(self.operators.iter().find(|o| o.email == email).cloned())
    }

    async fn supervisor_by_email(&self, email: &str) -> Result<Option<Supervisor>, TaskError> {
        Ok(self.supervisors.iter().find(|s| s.email == email).cloned())
    }
}

// ============================================================================
// Менеджер-регистратор (для проверки маршрутизации)
// ============================================================================

pub struct RecordingManager {
    kind: TaskKind,
    pub check_calls: AtomicU32,
    pub update_calls: AtomicU32,
    pub tick_calls: AtomicU32,
}

impl RecordingManager {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            check_calls: AtomicU32::new(0),
            update_calls: AtomicU32::new(0),
            tick_calls: AtomicU32::new(0),
        }
    }

    fn default_details(&self) -> TaskDetails {
        match self.kind {
            TaskKind::GenerateAnomaliesReport => TaskDetails::GenerateAnomaliesReport {
                start_report_date: Utc::now(),
                end_report_date: Utc::now(),
                title: "test".into(),
                threshold: 1.0,
            },
            TaskKind::GenerateConsumptionReport => TaskDetails::GenerateConsumptionReport {
                start_report_date: Utc::now(),
                end_report_date: Utc::now(),
                title: "test".into(),
            },
            TaskKind::MaintenanceDevice => TaskDetails::MaintenanceDevice,
            TaskKind::MonitorizeConsumption => {
                TaskDetails::MonitorizeConsumption { threshold: 1.0 }
            }
        }
    }
}

#[async_trait]
impl TaskManager for RecordingManager {
    fn kind(&self) -> TaskKind {
        self.kind
    }

    fn check_attributes(&self, _dto: &CreateTaskDto) -> Result<(), TaskError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn build_details(&self, _dto: &CreateTaskDto) -> Result<TaskDetails, TaskError> {
        Ok(self.default_details())
    }

    fn apply_update(
        &self,
        _details: &mut TaskDetails,
        _dto: &UpdateTaskDto,
    ) -> Result<(), TaskError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn tick(&self, _task: &ScheduledTask) -> anyhow::Result<()> {
        self.tick_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Фабрики тестовых данных
// ============================================================================

pub fn test_device(name: &str) -> Device {
    Device::new_for_insert(
        format!("DEV-{}", name),
        format!("Устройство {}", name),
        name.to_string(),
        None,
        Some(10.0),
        None,
    )
}

pub fn test_operator(email: &str) -> Operator {
    Operator::new_for_insert(format!("OPR-{}", email), "Оператор".into(), email.to_string())
}

pub fn test_supervisor(email: &str) -> Supervisor {
    Supervisor::new_for_insert(
        format!("SPV-{}", email),
        "Супервизор".into(),
        email.to_string(),
    )
}
