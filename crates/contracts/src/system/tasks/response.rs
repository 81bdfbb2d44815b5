use crate::domain::common::AggregateId;
use crate::system::tasks::aggregate::{ScheduledTask, TaskDetails};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Формат дат в проекциях списков: "Wed May 01 2024"
fn day_date(d: &DateTime<Utc>) -> String {
    d.format("%a %b %d %Y").to_string()
}

// ============================================================================
// Краткая проекция (для списков)
// ============================================================================

/// Краткая проекция задания
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(rename = "type")]
    pub task_type: String,
    pub frequency: String,
    pub start_date: String,
    /// None для бессрочных заданий (не пустая строка)
    pub end_date: Option<String>,
    pub public_id: String,
}

impl From<&ScheduledTask> for TaskView {
    fn from(task: &ScheduledTask) -> Self {
        Self {
            task_type: task.kind().code().to_string(),
            frequency: task.frequency.code().to_string(),
            start_date: day_date(&task.start_date),
            end_date: task.end_date.as_ref().map(day_date),
            public_id: task.base.code.clone(),
        }
    }
}

// ============================================================================
// Полная проекция
// ============================================================================

/// Полная проекция задания: краткая плюс поля конкретного вида
///
/// Поля чужих видов отдаются как None, а не как пустые строки.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    #[serde(rename = "type")]
    pub task_type: String,
    pub frequency: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub public_id: String,

    pub description: String,
    pub device_id: String,
    pub operator_id: Option<String>,
    pub supervisor_id: Option<String>,

    pub title: Option<String>,
    pub start_report_date: Option<String>,
    pub end_report_date: Option<String>,
    pub threshold: Option<f64>,
}

impl From<&ScheduledTask> for TaskDetail {
    fn from(task: &ScheduledTask) -> Self {
        let view = TaskView::from(task);

        let (title, start_report_date, end_report_date, threshold) = match &task.details {
            TaskDetails::GenerateAnomaliesReport {
                start_report_date,
                end_report_date,
                title,
                threshold,
            } => (
                Some(title.clone()),
                Some(day_date(start_report_date)),
                Some(day_date(end_report_date)),
                Some(*threshold),
            ),
            TaskDetails::GenerateConsumptionReport {
                start_report_date,
                end_report_date,
                title,
            } => (
                Some(title.clone()),
                Some(day_date(start_report_date)),
                Some(day_date(end_report_date)),
                None,
            ),
            TaskDetails::MaintenanceDevice => (None, None, None, None),
            TaskDetails::MonitorizeConsumption { threshold } => {
                (None, None, None, Some(*threshold))
            }
        };

        Self {
            task_type: view.task_type,
            frequency: view.frequency,
            start_date: view.start_date,
            end_date: view.end_date,
            public_id: view.public_id,
            description: task.base.description.clone(),
            device_id: task.device_id.as_string(),
            operator_id: task.assignee.operator_id().map(|id| id.as_string()),
            supervisor_id: task.assignee.supervisor_id().map(|id| id.as_string()),
            title,
            start_report_date,
            end_report_date,
            threshold,
        }
    }
}

/// Список кратких проекций
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_device::aggregate::DeviceId;
    use crate::domain::a002_operator::aggregate::OperatorId;
    use crate::enums::frequency::Frequency;
    use crate::system::tasks::aggregate::TaskAssignee;
    use chrono::TimeZone;

    fn anomalies_task() -> ScheduledTask {
        ScheduledTask::new_for_insert(
            "Report 1".into(),
            DeviceId::new_v4(),
            TaskAssignee::Operator(OperatorId::new_v4()),
            Frequency::Daily,
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap()),
            TaskDetails::GenerateAnomaliesReport {
                start_report_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                end_report_date: Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap(),
                title: "Report 1".into(),
                threshold: 5.0,
            },
        )
    }

    #[test]
    fn test_view_formats_day_dates() {
        let view = TaskView::from(&anomalies_task());
        assert_eq!(view.task_type, "GENERATE_ANOMALIES_REPORT");
        assert_eq!(view.frequency, "DAILY");
        assert_eq!(view.start_date, "Wed May 01 2024");
        assert_eq!(view.end_date.as_deref(), Some("Fri May 10 2024"));
        assert!(view.public_id.starts_with("TSK-"));
    }

    #[test]
    fn test_view_renders_missing_end_date_as_none() {
        let mut task = anomalies_task();
        task.end_date = None;
        let view = TaskView::from(&task);
        assert_eq!(view.end_date, None);
    }

    #[test]
    fn test_detail_adds_kind_fields() {
        let detail = TaskDetail::from(&anomalies_task());
        assert_eq!(detail.title.as_deref(), Some("Report 1"));
        assert_eq!(detail.start_report_date.as_deref(), Some("Wed May 01 2024"));
        assert_eq!(detail.end_report_date.as_deref(), Some("Fri May 10 2024"));
        assert_eq!(detail.threshold, Some(5.0));
        assert!(detail.operator_id.is_some());
        assert_eq!(detail.supervisor_id, None);
    }

    #[test]
    fn test_detail_of_maintenance_task_has_absent_kind_fields() {
        let mut task = anomalies_task();
        task.details = TaskDetails::MaintenanceDevice;
        let detail = TaskDetail::from(&task);
        assert_eq!(detail.title, None);
        assert_eq!(detail.start_report_date, None);
        assert_eq!(detail.end_report_date, None);
        assert_eq!(detail.threshold, None);
    }
}
