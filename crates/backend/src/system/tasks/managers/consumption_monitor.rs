use async_trait::async_trait;
use contracts::domain::a004_alert::request::AlertDraft;
use contracts::enums::alert_priority::AlertPriority;
use contracts::enums::alert_type::AlertType;
use contracts::enums::task_kind::TaskKind;
use contracts::system::tasks::aggregate::{ScheduledTask, TaskDetails};
use contracts::system::tasks::request::{CreateTaskDto, UpdateTaskDto};
use std::sync::Arc;

use crate::system::tasks::error::TaskError;
use crate::system::tasks::manager::TaskManager;
use crate::system::tasks::ports::{AlertSink, MeasurementSink};

/// Менеджер заданий мониторинга потребления
///
/// Срабатывание просит регистр снять синтетический замер; замер выше
/// порога задания дополнительно поднимает оповещение о нетипичном
/// потреблении.
pub struct MonitorizeConsumptionManager {
    measurements: Arc<dyn MeasurementSink>,
    alerts: Arc<dyn AlertSink>,
}

impl MonitorizeConsumptionManager {
    pub fn new(measurements: Arc<dyn MeasurementSink>, alerts: Arc<dyn AlertSink>) -> Self {
        Self {
            measurements,
            alerts,
        }
    }
}

#[async_trait]
impl TaskManager for MonitorizeConsumptionManager {
    fn kind(&self) -> TaskKind {
        TaskKind::MonitorizeConsumption
    }

    fn check_attributes(&self, dto: &CreateTaskDto) -> Result<(), TaskError> {
        if dto.threshold.is_none() {
            return Err(TaskError::missing_field("threshold"));
        }
        Ok(())
    }

    fn build_details(&self, dto: &CreateTaskDto) -> Result<TaskDetails, TaskError> {
        let threshold = dto
            .threshold
            .ok_or_else(|| TaskError::missing_field("threshold"))?;
        Ok(TaskDetails::MonitorizeConsumption { threshold })
    }

    fn apply_update(
        &self,
        details: &mut TaskDetails,
        dto: &UpdateTaskDto,
    ) -> Result<(), TaskError> {
        match details {
            TaskDetails::MonitorizeConsumption { threshold } => {
                if let Some(new_threshold) = dto.threshold {
                    *threshold = new_threshold;
                }
                Ok(())
            }
            _ => Err(TaskError::validation(
                "task details do not match MONITORIZE_CONSUMPTION",
            )),
        }
    }

    async fn tick(&self, task: &ScheduledTask) -> anyhow::Result<()> {
        let threshold = match task.details {
            TaskDetails::MonitorizeConsumption { threshold } => threshold,
            _ => anyhow::bail!("task details do not match MONITORIZE_CONSUMPTION"),
        };

        let record = self.measurements.record_consumption(task.device_id).await?;

        if record.value_kwh > threshold {
            let draft = AlertDraft {
                message: format!(
                    "Unusual consumption: {:.2} kWh exceeds threshold {:.2} kWh",
                    record.value_kwh, threshold
                ),
                alert_type: AlertType::UnusualConsumption,
                priority: AlertPriority::Medium,
                device_id: task.device_id,
                operator_id: task.assignee.operator_id(),
                supervisor_id: task.assignee.supervisor_id(),
            };
            self.alerts.create_alert(draft).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_device::aggregate::DeviceId;
    use contracts::domain::a002_operator::aggregate::OperatorId;
    use contracts::domain::a004_alert::aggregate::Alert;
    use contracts::enums::frequency::Frequency;
    use contracts::projections::p001_energy_consumption::dto::EnergyConsumptionDto;
    use contracts::system::tasks::aggregate::TaskAssignee;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAlertSink {
        drafts: Mutex<Vec<AlertDraft>>,
    }

    #[async_trait]
    impl AlertSink for RecordingAlertSink {
        async fn create_alert(&self, draft: AlertDraft) -> anyhow::Result<Alert> {
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

    /// Регистр с детерминированным значением замера
    struct FixedMeasurementSink {
        value_kwh: f64,
        calls: Mutex<u32>,
    }

    impl FixedMeasurementSink {
        fn new(value_kwh: f64) -> Self {
            Self {
                value_kwh,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl MeasurementSink for FixedMeasurementSink {
        async fn record_consumption(
            &self,
            device_id: DeviceId,
        ) -> anyhow::Result<EnergyConsumptionDto> {
            *self.calls.lock().unwrap() += 1;
            Ok(EnergyConsumptionDto {
                id: "m-test".into(),
                device_ref: device_id.0.to_string(),
                measured_at: chrono::Utc::now(),
                value_kwh: self.value_kwh,
                synthetic: true,
            })
        }
    }

    fn monitor_task(threshold: f64) -> ScheduledTask {
        ScheduledTask::new_for_insert(
            "Мониторинг".into(),
            DeviceId::new_v4(),
            TaskAssignee::Operator(OperatorId::new_v4()),
            Frequency::Daily,
            chrono::Utc::now(),
            None,
            TaskDetails::MonitorizeConsumption { threshold },
        )
    }

    #[tokio::test]
    async fn test_tick_records_one_measurement() {
        let measurements = Arc::new(FixedMeasurementSink::new(2.0));
        let alerts = Arc::new(RecordingAlertSink::default());
        let manager = MonitorizeConsumptionManager::new(measurements.clone(), alerts.clone());

        manager.tick(&monitor_task(5.0)).await.unwrap();

        assert_eq!(*measurements.calls.lock().unwrap(), 1);
        // Замер ниже порога — без оповещений
        assert!(alerts.drafts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tick_raises_alert_above_threshold() {
        let measurements = Arc::new(FixedMeasurementSink::new(9.5));
        let alerts = Arc::new(RecordingAlertSink::default());
        let manager = MonitorizeConsumptionManager::new(measurements, alerts.clone());

        manager.tick(&monitor_task(5.0)).await.unwrap();

        let drafts = alerts.drafts.lock().unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].alert_type, AlertType::UnusualConsumption);
        assert_eq!(drafts[0].priority, AlertPriority::Medium);
    }

    #[test]
    fn test_check_attributes_requires_threshold() {
        let manager = MonitorizeConsumptionManager::new(
            Arc::new(FixedMeasurementSink::new(0.0)),
            Arc::new(RecordingAlertSink::default()),
        );

        let err = manager.check_attributes(&CreateTaskDto::default()).unwrap_err();
        assert!(matches!(err, TaskError::Validation(msg) if msg.contains("threshold")));

        let dto = CreateTaskDto {
            threshold: Some(5.0),
            ..Default::default()
        };
        assert!(manager.check_attributes(&dto).is_ok());
    }

    #[test]
    fn test_apply_update_changes_only_present_fields() {
        let manager = MonitorizeConsumptionManager::new(
            Arc::new(FixedMeasurementSink::new(0.0)),
            Arc::new(RecordingAlertSink::default()),
        );

        let mut details = TaskDetails::MonitorizeConsumption { threshold: 5.0 };

        // Пустое частичное обновление не трогает порог
        manager
            .apply_update(&mut details, &UpdateTaskDto::default())
            .unwrap();
        assert_eq!(details, TaskDetails::MonitorizeConsumption { threshold: 5.0 });

        let dto = UpdateTaskDto {
            threshold: Some(8.0),
            ..Default::default()
        };
        manager.apply_update(&mut details, &dto).unwrap();
        assert_eq!(details, TaskDetails::MonitorizeConsumption { threshold: 8.0 });
    }
}
