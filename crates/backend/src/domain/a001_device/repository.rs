use chrono::Utc;
use contracts::domain::a001_device::aggregate::{Device, DeviceId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_device")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub name: String,
    pub location: Option<String>,
    pub max_consumption_kwh: Option<f64>,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Device {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Device {
            base: BaseAggregate::with_metadata(
                DeviceId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            name: m.name,
            location: m.location,
            max_consumption_kwh: m.max_consumption_kwh,
        }
    }
}

fn to_active_model(device: &Device) -> ActiveModel {
    ActiveModel {
        id: Set(device.base.id.0.to_string()),
        code: Set(device.base.code.clone()),
        description: Set(device.base.description.clone()),
        comment: Set(device.base.comment.clone()),
        name: Set(device.name.clone()),
        location: Set(device.location.clone()),
        max_consumption_kwh: Set(device.max_consumption_kwh),
        is_deleted: Set(device.base.metadata.is_deleted),
        is_posted: Set(device.base.metadata.is_posted),
        created_at: Set(Some(device.base.metadata.created_at)),
        updated_at: Set(Some(device.base.metadata.updated_at)),
        version: Set(device.base.metadata.version),
    }
}

pub async fn list_all() -> Result<Vec<Device>, DbErr> {
    let db = get_connection();
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Code)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Device::from).collect())
}

pub async fn get_by_id(id: Uuid) -> Result<Option<Device>, DbErr> {
    let db = get_connection();
    let model = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(model.map(Device::from))
}

pub async fn get_by_name(name: &str) -> Result<Option<Device>, DbErr> {
    let db = get_connection();
    let model = Entity::find()
        .filter(Column::Name.eq(name))
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(model.map(Device::from))
}

pub async fn insert(device: &Device) -> Result<(), DbErr> {
    let db = get_connection();
    to_active_model(device).insert(db).await?;
    Ok(())
}

pub async fn update(device: &Device) -> Result<(), DbErr> {
    let db = get_connection();
    to_active_model(device).update(db).await?;
    Ok(())
}

pub async fn soft_delete(id: Uuid) -> Result<(), DbErr> {
    let db = get_connection();
    Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .exec(db)
        .await?;
    Ok(())
}
