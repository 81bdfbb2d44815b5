use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::logger::TaskLogger;
use super::ports::{FireDecision, JobHandler, TaskStore};
use super::registry::TaskManagerRegistry;

/// Обработчик срабатываний и протокол завершения
///
/// Порядок одного срабатывания жесткий:
/// 1. перечитать задание из хранилища (payload рантайма — только кеш,
///    изменения после регистрации обязаны действовать);
/// 2. выполнить действие вида; отказ действия логируется и НЕ отменяет
///    шаг 3;
/// 3. сверить дату окончания с текущим моментом — истекшее задание
///    снимается с регистрации. Проверка повторяется на каждом
///    срабатывании: update может перенести дату окончания в прошлое
///    уже после регистрации.
pub struct TaskTickHandler {
    store: Arc<dyn TaskStore>,
    registry: Arc<TaskManagerRegistry>,
    logger: Arc<TaskLogger>,
}

impl TaskTickHandler {
    pub fn new(
        store: Arc<dyn TaskStore>,
        registry: Arc<TaskManagerRegistry>,
        logger: Arc<TaskLogger>,
    ) -> Self {
        Self {
            store,
            registry,
            logger,
        }
    }
}

#[async_trait]
impl JobHandler for TaskTickHandler {
    async fn on_fire(&self, key: &str) -> FireDecision {
        let task = match self.store.get_by_public_id(key).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                // Осиротевшая регистрация (задание удалено в обход
                // delete) — снимаем
                warn!("Task {} no longer exists, cancelling its job", key);
                return FireDecision::Expire;
            }
            Err(e) => {
                // Транзиентный отказ хранилища не убивает регистрацию
                error!("Failed to load task {} on fire: {}", key, e);
                return FireDecision::Reschedule;
            }
        };

        let Some(manager) = self.registry.get(task.kind()) else {
            warn!(
                "No manager registered for task {} of kind {}, cancelling",
                key,
                task.kind()
            );
            return FireDecision::Expire;
        };

        let _ = self
            .logger
            .write_log(key, &format!("Fired ({})", task.kind().code()));

        if let Err(e) = manager.tick(&task).await {
            error!("Tick action of task {} failed: {:#}", key, e);
            let _ = self
                .logger
                .write_log(key, &format!("Tick action failed: {:#}", e));
        }

        if task.is_expired_at(Utc::now()) {
            info!("Task {} passed its end date, cancelling its job", key);
            let _ = self.logger.write_log(key, "End date passed, job cancelled");
            FireDecision::Expire
        } else {
            FireDecision::Reschedule
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::tasks::managers::{
        MaintenanceDeviceManager, MonitorizeConsumptionManager,
    };
    use crate::system::tasks::ports::JobRuntime;
    use crate::system::tasks::runtime::TokioJobRuntime;
    use crate::system::tasks::testkit::{
        FixedMeasurementSink, InMemoryTaskStore, RecordingAlertSink,
    };
    use contracts::domain::a001_device::aggregate::DeviceId;
    use contracts::domain::a002_operator::aggregate::OperatorId;
    use contracts::enums::frequency::Frequency;
    use contracts::system::tasks::aggregate::{
        ScheduledTask, TaskAssignee, TaskDetails,
    };
    use chrono::{DateTime, TimeZone};
    use std::time::Duration;

    fn monitor_task(end_date: Option<DateTime<Utc>>) -> ScheduledTask {
        ScheduledTask::new_for_insert(
            "Мониторинг".into(),
            DeviceId::new_v4(),
            TaskAssignee::Operator(OperatorId::new_v4()),
            Frequency::Daily,
            Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap(),
            end_date,
            TaskDetails::MonitorizeConsumption { threshold: 100.0 },
        )
    }

    fn maintenance_task(end_date: Option<DateTime<Utc>>) -> ScheduledTask {
        let mut task = monitor_task(end_date);
        task.details = TaskDetails::MaintenanceDevice;
        task
    }

    struct Fixture {
        store: Arc<InMemoryTaskStore>,
        measurements: Arc<FixedMeasurementSink>,
        alerts: Arc<RecordingAlertSink>,
        handler: Arc<TaskTickHandler>,
    }

    fn fixture(task: ScheduledTask) -> Fixture {
        let store = Arc::new(InMemoryTaskStore::with_task(task));
        let measurements = Arc::new(FixedMeasurementSink::new(1.0));
        let alerts = Arc::new(RecordingAlertSink::new());

        let mut registry = TaskManagerRegistry::new();
        registry.register(MonitorizeConsumptionManager::new(
            measurements.clone(),
            alerts.clone(),
        ));
        registry.register(MaintenanceDeviceManager::new(alerts.clone()));

        let handler = Arc::new(TaskTickHandler::new(
            store.clone(),
            Arc::new(registry),
            Arc::new(TaskLogger::new("target/test-task-logs")),
        ));

        Fixture {
            store,
            measurements,
            alerts,
            handler,
        }
    }

    #[tokio::test]
    async fn test_fire_runs_action_then_expires_past_end_date() {
        let past = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let task = monitor_task(Some(past));
        let key = task.public_id().to_string();
        let fx = fixture(task);

        let decision = fx.handler.on_fire(&key).await;

        // Действие выполнено, затем регистрация снята
        assert_eq!(fx.measurements.calls(), 1);
        assert_eq!(decision, FireDecision::Expire);
    }

    #[tokio::test]
    async fn test_maintenance_fire_alerts_then_expires_past_end_date() {
        let past = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let task = maintenance_task(Some(past));
        let key = task.public_id().to_string();
        let fx = fixture(task);

        let decision = fx.handler.on_fire(&key).await;

        // Оповещение создано И регистрация снята
        assert_eq!(fx.alerts.draft_count(), 1);
        assert_eq!(decision, FireDecision::Expire);
    }

    #[tokio::test]
    async fn test_maintenance_fire_with_future_end_date_stays_scheduled() {
        let future = Utc::now() + chrono::Duration::days(7);
        let task = maintenance_task(Some(future));
        let key = task.public_id().to_string();
        let fx = fixture(task);

        assert_eq!(fx.handler.on_fire(&key).await, FireDecision::Reschedule);
        assert_eq!(fx.alerts.draft_count(), 1);
    }

    #[tokio::test]
    async fn test_fire_keeps_future_end_date_scheduled() {
        let future = Utc::now() + chrono::Duration::days(30);
        let task = monitor_task(Some(future));
        let key = task.public_id().to_string();
        let fx = fixture(task);

        assert_eq!(fx.handler.on_fire(&key).await, FireDecision::Reschedule);
        assert_eq!(fx.measurements.calls(), 1);
    }

    #[tokio::test]
    async fn test_endless_task_reschedules_forever() {
        let task = monitor_task(None);
        let key = task.public_id().to_string();
        let fx = fixture(task);

        assert_eq!(fx.handler.on_fire(&key).await, FireDecision::Reschedule);
        assert_eq!(fx.handler.on_fire(&key).await, FireDecision::Reschedule);
        assert_eq!(fx.measurements.calls(), 2);
    }

    #[tokio::test]
    async fn test_action_failure_does_not_skip_termination_check() {
        let past = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let task = maintenance_task(Some(past));
        let key = task.public_id().to_string();
        let fx = fixture(task);

        // Сервис оповещений падает, но проверка срока все равно
        // выполняется и задание снимается
        fx.alerts.set_fail(true);
        assert_eq!(fx.handler.on_fire(&key).await, FireDecision::Expire);
        assert_eq!(fx.alerts.draft_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_task_expires_orphan_registration() {
        let fx = fixture(monitor_task(None));
        assert_eq!(fx.handler.on_fire("TSK-missing").await, FireDecision::Expire);
        assert_eq!(fx.measurements.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_read_failure_reschedules() {
        let task = monitor_task(None);
        let key = task.public_id().to_string();
        let fx = fixture(task);

        fx.store.set_fail_reads(true);
        assert_eq!(fx.handler.on_fire(&key).await, FireDecision::Reschedule);
        assert_eq!(fx.measurements.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_moving_end_date_to_past_makes_next_fire_last() {
        let task = monitor_task(None);
        let key = task.public_id().to_string();
        let fx = fixture(task.clone());

        // Бессрочное задание продолжает срабатывать
        assert_eq!(fx.handler.on_fire(&key).await, FireDecision::Reschedule);

        // Update переносит дату окончания в прошлое — следующее
        // срабатывание становится последним
        let mut updated = task;
        updated.end_date = Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        fx.store.update(&updated).await.unwrap();

        assert_eq!(fx.handler.on_fire(&key).await, FireDecision::Expire);
        assert_eq!(fx.measurements.calls(), 2);
    }

    /// Сценарий целиком через рантайм: задание с истекшим сроком
    /// срабатывает ровно один раз и снимается с регистрации
    #[tokio::test(start_paused = true)]
    async fn test_expired_task_fires_once_through_runtime() {
        let past = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let task = monitor_task(Some(past));
        let key = task.public_id().to_string();
        let fx = fixture(task.clone());

        let runtime = TokioJobRuntime::new(fx.handler.clone());
        runtime
            .schedule(&key, task.refire_interval_ms, task)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fx.measurements.calls(), 1);
        assert!(!runtime.is_scheduled(&key).await);

        // Второго срабатывания не происходит даже спустя интервалы
        tokio::time::sleep(Duration::from_millis(3 * 86_400_000)).await;
        assert_eq!(fx.measurements.calls(), 1);
    }
}
