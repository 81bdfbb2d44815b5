use chrono::Utc;
use contracts::domain::a001_device::aggregate::DeviceId;
use contracts::domain::a002_operator::aggregate::OperatorId;
use contracts::domain::a003_supervisor::aggregate::SupervisorId;
use contracts::domain::a004_alert::aggregate::{Alert, AlertId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::enums::alert_priority::AlertPriority;
use contracts::enums::alert_type::AlertType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a004_alert")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub message: String,
    pub alert_type: String,
    pub priority: String,
    pub resolved: bool,
    pub device_id: String,
    pub operator_id: Option<String>,
    pub supervisor_id: Option<String>,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Alert {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        let alert_type = AlertType::from_code(&m.alert_type).unwrap_or(AlertType::Maintenance);
        let priority = AlertPriority::from_code(&m.priority).unwrap_or(AlertPriority::Low);
        let device_id = Uuid::parse_str(&m.device_id)
            .map(DeviceId::new)
            .unwrap_or_else(|_| DeviceId::new_v4());

        Alert {
            base: BaseAggregate::with_metadata(
                AlertId(uuid),
                m.code,
                m.message.clone(),
                None,
                metadata,
            ),
            message: m.message,
            alert_type,
            priority,
            resolved: m.resolved,
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
        }
    }
}

fn to_active_model(alert: &Alert) -> ActiveModel {
    ActiveModel {
        id: Set(alert.base.id.0.to_string()),
        code: Set(alert.base.code.clone()),
        message: Set(alert.message.clone()),
        alert_type: Set(alert.alert_type.code().to_string()),
        priority: Set(alert.priority.code().to_string()),
        resolved: Set(alert.resolved),
        device_id: Set(alert.device_id.0.to_string()),
        operator_id: Set(alert.operator_id.map(|id| id.0.to_string())),
        supervisor_id: Set(alert.supervisor_id.map(|id| id.0.to_string())),
        is_deleted: Set(alert.base.metadata.is_deleted),
        is_posted: Set(alert.base.metadata.is_posted),
        created_at: Set(Some(alert.base.metadata.created_at)),
        updated_at: Set(Some(alert.base.metadata.updated_at)),
        version: Set(alert.base.metadata.version),
    }
}

pub async fn list_all() -> Result<Vec<Alert>, DbErr> {
    let db = get_connection();
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Alert::from).collect())
}

pub async fn list_for_device(device_id: Uuid) -> Result<Vec<Alert>, DbErr> {
    let db = get_connection();
    let models = Entity::find()
        .filter(Column::DeviceId.eq(device_id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Alert::from).collect())
}

pub async fn get_by_id(id: Uuid) -> Result<Option<Alert>, DbErr> {
    let db = get_connection();
    let model = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(model.map(Alert::from))
}

pub async fn insert(alert: &Alert) -> Result<(), DbErr> {
    let db = get_connection();
    to_active_model(alert).insert(db).await?;
    Ok(())
}

pub async fn update(alert: &Alert) -> Result<(), DbErr> {
    let db = get_connection();
    to_active_model(alert).update(db).await?;
    Ok(())
}
