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

/// Менеджер заданий формирования отчета по аномалиям потребления
///
/// Срабатывание формирует отчет: сервис отчетов считает замеры выше
/// порога внутри отчетного периода.
pub struct GenerateAnomaliesReportManager {
    reports: Arc<dyn ReportSink>,
}

impl GenerateAnomaliesReportManager {
    pub fn new(reports: Arc<dyn ReportSink>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl TaskManager for GenerateAnomaliesReportManager {
    fn kind(&self) -> TaskKind {
        TaskKind::GenerateAnomaliesReport
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
        if dto.threshold.is_none() {
            return Err(TaskError::missing_field("threshold"));
        }
        Ok(())
    }

    fn build_details(&self, dto: &CreateTaskDto) -> Result<TaskDetails, TaskError> {
        self.check_attributes(dto)?;
        let start_report_date =
            parse_wire_date("startReportDate", dto.start_report_date.as_deref().unwrap())?;
        let end_report_date =
            parse_wire_date("endReportDate", dto.end_report_date.as_deref().unwrap())?;

        Ok(TaskDetails::GenerateAnomaliesReport {
            start_report_date,
            end_report_date,
            title: dto.title.clone().unwrap(),
            threshold: dto.threshold.unwrap(),
        })
    }

    fn apply_update(
        &self,
        details: &mut TaskDetails,
        dto: &UpdateTaskDto,
    ) -> Result<(), TaskError> {
        match details {
            TaskDetails::GenerateAnomaliesReport {
                start_report_date,
                end_report_date,
                title,
                threshold,
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
                if let Some(value) = dto.threshold {
                    *threshold = value;
                }
                Ok(())
            }
            _ => Err(TaskError::validation(
                "task details do not match GENERATE_ANOMALIES_REPORT",
            )),
        }
    }

    async fn tick(&self, task: &ScheduledTask) -> anyhow::Result<()> {
        let (start_report_date, end_report_date, title, threshold) = match &task.details {
            TaskDetails::GenerateAnomaliesReport {
                start_report_date,
                end_report_date,
                title,
                threshold,
            } => (*start_report_date, *end_report_date, title.clone(), *threshold),
            _ => anyhow::bail!("task details do not match GENERATE_ANOMALIES_REPORT"),
        };

        let draft = ReportDraft {
            report_type: ReportType::Anomalies,
            title,
            start_report_date,
            end_report_date,
            device_id: task.device_id,
            operator_id: task.assignee.operator_id(),
            supervisor_id: task.assignee.supervisor_id(),
            threshold: Some(threshold),
        };
        self.reports.create_report(draft).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_device::aggregate::DeviceId;
    use contracts::domain::a003_supervisor::aggregate::SupervisorId;
    use contracts::domain::a005_report::aggregate::Report;
    use contracts::enums::frequency::Frequency;
    use contracts::system::tasks::aggregate::TaskAssignee;
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

    fn create_dto() -> CreateTaskDto {
        CreateTaskDto {
            task_type: "GENERATE_ANOMALIES_REPORT".into(),
            start_report_date: Some("2024-05-01".into()),
            end_report_date: Some("2024-05-10".into()),
            title: Some("Report 1".into()),
            threshold: Some(5.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_attributes_names_missing_field() {
        let manager = GenerateAnomaliesReportManager::new(Arc::new(RecordingReportSink::default()));

        let mut dto = create_dto();
        dto.threshold = None;
        let err = manager.check_attributes(&dto).unwrap_err();
        assert!(matches!(err, TaskError::Validation(msg) if msg.contains("threshold")));

        let mut dto = create_dto();
        dto.title = Some("   ".into());
        let err = manager.check_attributes(&dto).unwrap_err();
        assert!(matches!(err, TaskError::Validation(msg) if msg.contains("title")));

        assert!(manager.check_attributes(&create_dto()).is_ok());
    }

    #[test]
    fn test_build_details_parses_report_window() {
        let manager = GenerateAnomaliesReportManager::new(Arc::new(RecordingReportSink::default()));
        let details = manager.build_details(&create_dto()).unwrap();

        match details {
            TaskDetails::GenerateAnomaliesReport {
                start_report_date,
                end_report_date,
                title,
                threshold,
            } => {
                assert_eq!(start_report_date.format("%Y-%m-%d").to_string(), "2024-05-01");
                assert_eq!(end_report_date.format("%Y-%m-%d").to_string(), "2024-05-10");
                assert_eq!(title, "Report 1");
                assert_eq!(threshold, 5.0);
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tick_creates_anomalies_report() {
        let sink = Arc::new(RecordingReportSink::default());
        let manager = GenerateAnomaliesReportManager::new(sink.clone());

        let supervisor = SupervisorId::new_v4();
        let details = manager.build_details(&create_dto()).unwrap();
        let task = ScheduledTask::new_for_insert(
            "Report 1".into(),
            DeviceId::new_v4(),
            TaskAssignee::Supervisor(supervisor),
            Frequency::Daily,
            chrono::Utc::now(),
            None,
            details,
        );

        manager.tick(&task).await.unwrap();

        let drafts = sink.drafts.lock().unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].report_type, ReportType::Anomalies);
        assert_eq!(drafts[0].title, "Report 1");
        assert_eq!(drafts[0].threshold, Some(5.0));
        assert_eq!(drafts[0].supervisor_id, Some(supervisor));
        assert_eq!(drafts[0].operator_id, None);
    }
}
