use chrono::Utc;
use contracts::domain::a001_device::aggregate::DeviceId;
use contracts::domain::a002_operator::aggregate::OperatorId;
use contracts::domain::a003_supervisor::aggregate::SupervisorId;
use contracts::domain::a005_report::aggregate::{Report, ReportId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::enums::report_type::ReportType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a005_report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub report_type: String,
    pub title: String,
    pub start_report_date: chrono::DateTime<chrono::Utc>,
    pub end_report_date: chrono::DateTime<chrono::Utc>,
    pub device_id: String,
    pub operator_id: Option<String>,
    pub supervisor_id: Option<String>,
    pub threshold: Option<f64>,
    pub total_consumption_kwh: Option<f64>,
    pub anomalies_count: Option<i64>,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Report {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        let report_type = ReportType::from_code(&m.report_type).unwrap_or(ReportType::Consumption);
        let device_id = Uuid::parse_str(&m.device_id)
            .map(DeviceId::new)
            .unwrap_or_else(|_| DeviceId::new_v4());

        Report {
            base: BaseAggregate::with_metadata(
                ReportId(uuid),
                m.code,
                m.title.clone(),
                None,
                metadata,
            ),
            report_type,
            title: m.title,
            start_report_date: m.start_report_date,
            end_report_date: m.end_report_date,
            device_id,
            operator_id: m
                .operator_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(OperatorId::new),
            supervisor_id: m
                .supervisor_id
                .as_deref()
                .and_then(|s| Uuid::parse_str(s).ok())
                .map(SupervisorId::new),
            threshold: m.threshold,
            total_consumption_kwh: m.total_consumption_kwh,
            anomalies_count: m.anomalies_count,
            generated_at: m.generated_at,
        }
    }
}

fn to_active_model(report: &Report) -> ActiveModel {
    ActiveModel {
        id: Set(report.base.id.0.to_string()),
        code: Set(report.base.code.clone()),
        report_type: Set(report.report_type.code().to_string()),
        title: Set(report.title.clone()),
        start_report_date: Set(report.start_report_date),
        end_report_date: Set(report.end_report_date),
        device_id: Set(report.device_id.0.to_string()),
        operator_id: Set(report.operator_id.map(|id| id.0.to_string())),
        supervisor_id: Set(report.supervisor_id.map(|id| id.0.to_string())),
        threshold: Set(report.threshold),
        total_consumption_kwh: Set(report.total_consumption_kwh),
        anomalies_count: Set(report.anomalies_count),
        generated_at: Set(report.generated_at),
        is_deleted: Set(report.base.metadata.is_deleted),
        is_posted: Set(report.base.metadata.is_posted),
        created_at: Set(Some(report.base.metadata.created_at)),
        updated_at: Set(Some(report.base.metadata.updated_at)),
        version: Set(report.base.metadata.version),
    }
}

pub async fn list_all() -> Result<Vec<Report>, DbErr> {
    let db = get_connection();
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::GeneratedAt)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Report::from).collect())
}

pub async fn list_for_device(device_id: Uuid) -> Result<Vec<Report>, DbErr> {
    let db = get_connection();
    let models = Entity::find()
        .filter(Column::DeviceId.eq(device_id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::GeneratedAt)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Report::from).collect())
}

pub async fn get_by_id(id: Uuid) -> Result<Option<Report>, DbErr> {
    let db = get_connection();
    let model = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(model.map(Report::from))
}

pub async fn insert(report: &Report) -> Result<(), DbErr> {
    let db = get_connection();
    to_active_model(report).insert(db).await?;
    Ok(())
}
