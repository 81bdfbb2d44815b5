use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_device::aggregate::DeviceId;
use contracts::domain::a002_operator::aggregate::OperatorId;
use contracts::domain::a003_supervisor::aggregate::SupervisorId;
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::enums::frequency::Frequency;
use contracts::enums::task_kind::TaskKind;
use contracts::system::tasks::aggregate::{
    ScheduledTask, ScheduledTaskId, TaskAssignee, TaskDetails,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use super::error::TaskError;
use super::ports::TaskStore;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sys_tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Публичный идентификатор (код "TSK-...")
    pub code: String,
    pub task_type: String,
    pub description: Option<String>,
    pub frequency: String,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub device_id: String,
    pub operator_id: Option<String>,
    pub supervisor_id: Option<String>,
    pub start_report_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_report_date: Option<chrono::DateTime<chrono::Utc>>,
    pub title: Option<String>,
    pub threshold: Option<f64>,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Восстановить типизированное задание из строки таблицы
///
/// Здесь же происходит и разрешение периодичности в интервал: строка
/// хранит только код периодичности.
fn model_to_task(m: Model) -> Result<ScheduledTask, TaskError> {
    let kind = TaskKind::from_code(&m.task_type)
        .ok_or_else(|| TaskError::UnsupportedKind(m.task_type.clone()))?;
    let frequency = Frequency::from_code(&m.frequency).map_err(TaskError::InvalidFrequency)?;

    let id = Uuid::parse_str(&m.id)
        .map_err(|e| TaskError::validation(format!("corrupt task id {}: {}", m.id, e)))?;
    let device_id = Uuid::parse_str(&m.device_id)
        .map(DeviceId::new)
        .map_err(|e| TaskError::validation(format!("corrupt device id: {}", e)))?;

    let assignee = match (&m.operator_id, &m.supervisor_id) {
        (Some(op), _) => {
            let uuid = Uuid::parse_str(op)
                .map_err(|e| TaskError::validation(format!("corrupt operator id: {}", e)))?;
            TaskAssignee::Operator(OperatorId::new(uuid))
        }
        (None, Some(sv)) => {
            let uuid = Uuid::parse_str(sv)
                .map_err(|e| TaskError::validation(format!("corrupt supervisor id: {}", e)))?;
            TaskAssignee::Supervisor(SupervisorId::new(uuid))
        }
        (None, None) => {
            return Err(TaskError::validation(format!(
                "task {} has neither operator nor supervisor",
                m.code
            )))
        }
    };

    let details = match kind {
        TaskKind::GenerateAnomaliesReport => TaskDetails::GenerateAnomaliesReport {
            start_report_date: m
                .start_report_date
                .ok_or_else(|| TaskError::validation("task record lacks startReportDate"))?,
            end_report_date: m
                .end_report_date
                .ok_or_else(|| TaskError::validation("task record lacks endReportDate"))?,
            title: m
                .title
                .clone()
                .ok_or_else(|| TaskError::validation("task record lacks title"))?,
            threshold: m
                .threshold
                .ok_or_else(|| TaskError::validation("task record lacks threshold"))?,
        },
        TaskKind::GenerateConsumptionReport => TaskDetails::GenerateConsumptionReport {
            start_report_date: m
                .start_report_date
                .ok_or_else(|| TaskError::validation("task record lacks startReportDate"))?,
            end_report_date: m
                .end_report_date
                .ok_or_else(|| TaskError::validation("task record lacks endReportDate"))?,
            title: m
                .title
                .clone()
                .ok_or_else(|| TaskError::validation("task record lacks title"))?,
        },
        TaskKind::MaintenanceDevice => TaskDetails::MaintenanceDevice,
        TaskKind::MonitorizeConsumption => TaskDetails::MonitorizeConsumption {
            threshold: m
                .threshold
                .ok_or_else(|| TaskError::validation("task record lacks threshold"))?,
        },
    };

    let metadata = EntityMetadata {
        created_at: m.created_at.unwrap_or_else(Utc::now),
        updated_at: m.updated_at.unwrap_or_else(Utc::now),
        is_deleted: m.is_deleted,
        is_posted: false,
        version: m.version,
    };

    Ok(ScheduledTask {
        base: BaseAggregate::with_metadata(
            ScheduledTaskId(id),
            m.code,
            m.description.unwrap_or_default(),
            None,
            metadata,
        ),
        device_id,
        assignee,
        frequency,
        refire_interval_ms: frequency.interval_ms(),
        start_date: m.start_date,
        end_date: m.end_date,
        details,
    })
}

fn to_active_model(task: &ScheduledTask) -> ActiveModel {
    let (start_report_date, end_report_date, title, threshold) = match &task.details {
        TaskDetails::GenerateAnomaliesReport {
            start_report_date,
            end_report_date,
            title,
            threshold,
        } => (
            Some(*start_report_date),
            Some(*end_report_date),
            Some(title.clone()),
            Some(*threshold),
        ),
        TaskDetails::GenerateConsumptionReport {
            start_report_date,
            end_report_date,
            title,
        } => (
            Some(*start_report_date),
            Some(*end_report_date),
            Some(title.clone()),
            None,
        ),
        TaskDetails::MaintenanceDevice => (None, None, None, None),
        TaskDetails::MonitorizeConsumption { threshold } => (None, None, None, Some(*threshold)),
    };

    ActiveModel {
        id: Set(task.base.id.0.to_string()),
        code: Set(task.base.code.clone()),
        task_type: Set(task.kind().code().to_string()),
        description: Set(Some(task.base.description.clone())),
        frequency: Set(task.frequency.code().to_string()),
        start_date: Set(task.start_date),
        end_date: Set(task.end_date),
        device_id: Set(task.device_id.0.to_string()),
        operator_id: Set(task.assignee.operator_id().map(|id| id.0.to_string())),
        supervisor_id: Set(task.assignee.supervisor_id().map(|id| id.0.to_string())),
        start_report_date: Set(start_report_date),
        end_report_date: Set(end_report_date),
        title: Set(title),
        threshold: Set(threshold),
        is_deleted: Set(task.base.metadata.is_deleted),
        created_at: Set(Some(task.base.metadata.created_at)),
        updated_at: Set(Some(task.base.metadata.updated_at)),
        version: Set(task.base.metadata.version),
    }
}

// ============================================================================
// Хранилище поверх sea-orm
// ============================================================================

/// Хранилище регламентных заданий в таблице `sys_tasks`
///
/// Все четыре вида живут в одной таблице с дискриминатором
/// `task_type`; запись сама знает свой вид, поэтому update/delete
/// маршрутизируются по одному публичному идентификатору.
pub struct SqlTaskStore {
    db: DatabaseConnection,
}

impl SqlTaskStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for SqlTaskStore {
    async fn list_all(&self) -> Result<Vec<ScheduledTask>, TaskError> {
        let models = Entity::find()
            .filter(Column::IsDeleted.eq(false))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await?;
        models.into_iter().map(model_to_task).collect()
    }

    async fn list_by_kind(&self, kind: TaskKind) -> Result<Vec<ScheduledTask>, TaskError> {
        let models = Entity::find()
            .filter(Column::TaskType.eq(kind.code()))
            .filter(Column::IsDeleted.eq(false))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await?;
        models.into_iter().map(model_to_task).collect()
    }

    async fn get_by_public_id(
        &self,
        public_id: &str,
    ) -> Result<Option<ScheduledTask>, TaskError> {
        let model = Entity::find()
            .filter(Column::Code.eq(public_id))
            .filter(Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        model.map(model_to_task).transpose()
    }

    async fn insert(&self, task: &ScheduledTask) -> Result<(), TaskError> {
        to_active_model(task).insert(&self.db).await?;
        Ok(())
    }

    async fn update(&self, task: &ScheduledTask) -> Result<(), TaskError> {
        to_active_model(task).update(&self.db).await?;
        Ok(())
    }

    async fn delete_by_public_id(
        &self,
        public_id: &str,
    ) -> Result<Option<ScheduledTask>, TaskError> {
        // Толерантное удаление: ошибки хранилища деградируют до "не найдено"
        let found = match self.get_by_public_id(public_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Failed to load task {} for delete: {}", public_id, e);
                return Ok(None);
            }
        };

        let Some(task) = found else {
            return Ok(None);
        };

        let result = Entity::update_many()
            .col_expr(Column::IsDeleted, Expr::value(true))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Code.eq(public_id))
            .exec(&self.db)
            .await;

        match result {
            Ok(_) => Ok(Some(task)),
            Err(e) => {
                tracing::warn!("Failed to delete task {}: {}", public_id, e);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_isolated_database;
    use chrono::TimeZone;

    fn monitor_task() -> ScheduledTask {
        ScheduledTask::new_for_insert(
            "Мониторинг".into(),
            DeviceId::new_v4(),
            TaskAssignee::Operator(OperatorId::new_v4()),
            Frequency::Daily,
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap()),
            TaskDetails::MonitorizeConsumption { threshold: 5.0 },
        )
    }

    fn anomalies_task() -> ScheduledTask {
        ScheduledTask::new_for_insert(
            "Report 1".into(),
            DeviceId::new_v4(),
            TaskAssignee::Supervisor(SupervisorId::new_v4()),
            Frequency::Weekly,
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            None,
            TaskDetails::GenerateAnomaliesReport {
                start_report_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                end_report_date: Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap(),
                title: "Report 1".into(),
                threshold: 5.0,
            },
        )
    }

    async fn test_store() -> SqlTaskStore {
        SqlTaskStore::new(connect_isolated_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let store = test_store().await;
        let task = anomalies_task();
        store.insert(&task).await.unwrap();

        let loaded = store
            .get_by_public_id(task.public_id())
            .await
            .unwrap()
            .expect("task must be found");

        assert_eq!(loaded.base.id, task.base.id);
        assert_eq!(loaded.base.code, task.base.code);
        assert_eq!(loaded.kind(), TaskKind::GenerateAnomaliesReport);
        assert_eq!(loaded.frequency, Frequency::Weekly);
        // Интервал восстановлен из периодичности
        assert_eq!(loaded.refire_interval_ms, 604_800_000);
        assert_eq!(loaded.device_id, task.device_id);
        assert_eq!(loaded.assignee, task.assignee);
        assert_eq!(loaded.start_date, task.start_date);
        assert_eq!(loaded.end_date, None);
        assert_eq!(loaded.details, task.details);
    }

    #[tokio::test]
    async fn test_round_trip_consumption_report_kind() {
        let store = test_store().await;
        let mut task = anomalies_task();
        task.details = TaskDetails::GenerateConsumptionReport {
            start_report_date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            end_report_date: Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap(),
            title: "Сводный отчет".into(),
        };
        store.insert(&task).await.unwrap();

        let loaded = store
            .get_by_public_id(task.public_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.kind(), TaskKind::GenerateConsumptionReport);
        assert_eq!(loaded.details, task.details);
    }

    #[tokio::test]
    async fn test_round_trip_for_kind_without_extra_fields() {
        let store = test_store().await;
        let mut task = monitor_task();
        task.details = TaskDetails::MaintenanceDevice;
        store.insert(&task).await.unwrap();

        let loaded = store
            .get_by_public_id(task.public_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.details, TaskDetails::MaintenanceDevice);
    }

    #[tokio::test]
    async fn test_update_persists_changed_fields() {
        let store = test_store().await;
        let mut task = monitor_task();
        store.insert(&task).await.unwrap();

        task.details = TaskDetails::MonitorizeConsumption { threshold: 9.0 };
        task.end_date = Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        store.update(&task).await.unwrap();

        let loaded = store
            .get_by_public_id(task.public_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            loaded.details,
            TaskDetails::MonitorizeConsumption { threshold: 9.0 }
        );
        assert_eq!(
            loaded.end_date,
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn test_list_by_kind_filters() {
        let store = test_store().await;
        store.insert(&monitor_task()).await.unwrap();
        store.insert(&anomalies_task()).await.unwrap();

        let monitors = store
            .list_by_kind(TaskKind::MonitorizeConsumption)
            .await
            .unwrap();
        assert_eq!(monitors.len(), 1);
        assert_eq!(monitors[0].kind(), TaskKind::MonitorizeConsumption);

        let maintenance = store.list_by_kind(TaskKind::MaintenanceDevice).await.unwrap();
        assert!(maintenance.is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_tolerant() {
        let store = test_store().await;

        // Удаление несуществующего — не ошибка
        assert!(store.delete_by_public_id("TSK-missing").await.unwrap().is_none());

        let task = monitor_task();
        store.insert(&task).await.unwrap();

        let deleted = store.delete_by_public_id(task.public_id()).await.unwrap();
        assert!(deleted.is_some());

        // Запись скрыта из выборок
        assert!(store
            .get_by_public_id(task.public_id())
            .await
            .unwrap()
            .is_none());

        // Повторное удаление — уже "не найдено"
        assert!(store.delete_by_public_id(task.public_id()).await.unwrap().is_none());
    }
}
