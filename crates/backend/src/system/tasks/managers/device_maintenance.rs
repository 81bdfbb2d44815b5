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
use crate::system::tasks::ports::AlertSink;

/// Текст оповещения о техобслуживании (фиксированный)
const MAINTENANCE_MESSAGE: &str = "Maintenance is required.";

/// Менеджер заданий техобслуживания устройств
///
/// Срабатывание поднимает оповещение высокого приоритета по
/// устройству задания.
pub struct MaintenanceDeviceManager {
    alerts: Arc<dyn AlertSink>,
}

impl MaintenanceDeviceManager {
    pub fn new(alerts: Arc<dyn AlertSink>) -> Self {
        Self { alerts }
    }
}

#[async_trait]
impl TaskManager for MaintenanceDeviceManager {
    fn kind(&self) -> TaskKind {
        TaskKind::MaintenanceDevice
    }

    fn check_attributes(&self, _dto: &CreateTaskDto) -> Result<(), TaskError> {
        // Специфичных для вида полей нет
        Ok(())
    }

    fn build_details(&self, _dto: &CreateTaskDto) -> Result<TaskDetails, TaskError> {
        Ok(TaskDetails::MaintenanceDevice)
    }

    fn apply_update(
        &self,
        details: &mut TaskDetails,
        _dto: &UpdateTaskDto,
    ) -> Result<(), TaskError> {
        match details {
            TaskDetails::MaintenanceDevice => Ok(()),
            _ => Err(TaskError::validation(
                "task details do not match MAINTENANCE_DEVICE",
            )),
        }
    }

    async fn tick(&self, task: &ScheduledTask) -> anyhow::Result<()> {
        let draft = AlertDraft {
            message: MAINTENANCE_MESSAGE.to_string(),
            alert_type: AlertType::Maintenance,
            priority: AlertPriority::High,
            device_id: task.device_id,
            operator_id: task.assignee.operator_id(),
            supervisor_id: task.assignee.supervisor_id(),
        };
        self.alerts.create_alert(draft).await?;
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

    #[tokio::test]
    async fn test_tick_raises_high_priority_maintenance_alert() {
        let sink = Arc::new(RecordingAlertSink::default());
        let manager = MaintenanceDeviceManager::new(sink.clone());

        let operator = OperatorId::new_v4();
        let task = ScheduledTask::new_for_insert(
            "ТО устройства".into(),
            DeviceId::new_v4(),
            TaskAssignee::Operator(operator),
            Frequency::Weekly,
            chrono::Utc::now(),
            None,
            TaskDetails::MaintenanceDevice,
        );

        manager.tick(&task).await.unwrap();

        let drafts = sink.drafts.lock().unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].message, "Maintenance is required.");
        assert_eq!(drafts[0].alert_type, AlertType::Maintenance);
        assert_eq!(drafts[0].priority, AlertPriority::High);
        assert_eq!(drafts[0].device_id, task.device_id);
        assert_eq!(drafts[0].operator_id, Some(operator));
        assert_eq!(drafts[0].supervisor_id, None);
    }

    #[test]
    fn test_check_attributes_has_no_kind_fields() {
        let manager = MaintenanceDeviceManager::new(Arc::new(RecordingAlertSink::default()));
        assert!(manager.check_attributes(&CreateTaskDto::default()).is_ok());
    }
}
