use async_trait::async_trait;
use contracts::domain::a005_report::request::ReportDraft;
use contracts::enums::report_type::ReportType;
use contracts::enums::task_kind::TaskKind;
use contracts::system::tasks::aggregate::{ScheduledTask, TaskDetails};
use contracts::system::tasks::request::{CreateTaskDto, UpdateTaskDto};
use std::sync::Arc;

use crate::system::tasks::error::TaskError;
use crate::system::tasks::manager::{parse_wire_date, TaskManager};
use crate::system::tasks::ports::ReportSink;

/// Менеджер заданий формирования сводного отчета по потреблению
///
/// Тот же отчетный контур, что и у отчета по аномалиям, но без порога:
/// сервис отчетов считает суммарное потребление за период.
pub struct GenerateConsumptionReportManager {
    reports: Arc<dyn ReportSink>,
}

impl GenerateConsumptionReportManager {
    pub fn new(reports: Arc<dyn ReportSink>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl TaskManager for GenerateConsumptionReportManager {
    fn kind(&self) -> TaskKind {
        TaskKind::GenerateConsumptionReport
    }

    fn check_attributes(&self, dto: &CreateTaskDto) -> Result<(), TaskError> {
        if dto.start_report_date.is_none() {
            return Err(TaskError::missing_field("startReportDate"));
        }
        if dto.end_report_date.is_none() {
            return Err(TaskError::missing_field("endReportDate"));
        }
        if dto.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(TaskError::missing_field("title"));
        }
        Ok(())
    }

    fn build_details(&self, dto: &CreateTaskDto) -> Result<TaskDetails, TaskError> {
        self.check_attributes(dto)?;
        let start_report_date =
            parse_wire_date("startReportDate", dto.start_report_date.as_deref().unwrap())?;
        let end_report_date =
            parse_wire_date("endReportDate", dto.end_report_date.as_deref().unwrap())?;

        Ok(TaskDetails::GenerateConsumptionReport {
            start_report_date,
            end_report_date,
            title: dto.title.clone().unwrap(),
        })
    }

    fn apply_update(
        &self,
        details: &mut TaskDetails,
        dto: &UpdateTaskDto,
    ) -> Result<(), TaskError> {
        match details {
            TaskDetails::GenerateConsumptionReport {
                start_report_date,
                end_report_date,
                title,
            } => {
                if let Some(value) = dto.start_report_date.as_deref() {
                    *start_report_date = parse_wire_date("startReportDate", value)?;
                }
                if let Some(value) = dto.end_report_date.as_deref() {
                    *end_report_date = parse_wire_date("endReportDate", value)?;
                }
                if let Some(value) = dto.title.clone() {
                    *title = value;
                }
                Ok(())
            }
            _ => Err(TaskError::validation(
                "task details do not match GENERATE_CONSUMPTION_REPORT",
            )),
        }
    }

    async fn tick(&self, task: &ScheduledTask) -> anyhow::Result<()> {
        let (start_report_date, end_report_date, title) = match &task.details {
            TaskDetails::GenerateConsumptionReport {
                start_report_date,
                end_report_date,
                title,
            } => (*start_report_date, *end_report_date, title.clone()),
            _ => anyhow::bail!("task details do not match GENERATE_CONSUMPTION_REPORT"),
        };

        let draft = ReportDraft {
            report_type: ReportType::Consumption,
            title,
            start_report_date,
            end_report_date,
            device_id: task.device_id,
            operator_id: task.assignee.operator_id(),
            supervisor_id: task.assignee.supervisor_id(),
            threshold: None,
        };
        self.reports.create_report(draft).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a005_report::aggregate::Report;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingReportSink {
        drafts: Mutex<Vec<ReportDraft>>,
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

    #[test]
    fn test_check_attributes_does_not_require_threshold() {
        let manager =
            GenerateConsumptionReportManager::new(Arc::new(RecordingReportSink::default()));
        let dto = CreateTaskDto {
            task_type: "GENERATE_CONSUMPTION_REPORT".into(),
            start_report_date: Some("2024-05-01".into()),
            end_report_date: Some("2024-05-10".into()),
            title: Some("Сводный отчет".into()),
            ..Default::default()
        };
        assert!(manager.check_attributes(&dto).is_ok());

        let mut incomplete = dto.clone();
        incomplete.end_report_date = None;
        let err = manager.check_attributes(&incomplete).unwrap_err();
        assert!(matches!(err, TaskError::Validation(msg) if msg.contains("endReportDate")));
    }

    #[test]
    fn test_apply_update_keeps_absent_fields() {
        let manager =
            GenerateConsumptionReportManager::new(Arc::new(RecordingReportSink::default()));
        let mut details = TaskDetails::GenerateConsumptionReport {
            start_report_date: parse_wire_date("startReportDate", "2024-05-01").unwrap(),
            end_report_date: parse_wire_date("endReportDate", "2024-05-10").unwrap(),
            title: "Сводный отчет".into(),
        };

        let dto = UpdateTaskDto {
            title: Some("Новый заголовок".into()),
            ..Default::default()
        };
        manager.apply_update(&mut details, &dto).unwrap();

        match details {
            TaskDetails::GenerateConsumptionReport {
                start_report_date,
                title,
                ..
            } => {
                assert_eq!(title, "Новый заголовок");
                // Период не тронут
                assert_eq!(start_report_date.format("%Y-%m-%d").to_string(), "2024-05-01");
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }
}
