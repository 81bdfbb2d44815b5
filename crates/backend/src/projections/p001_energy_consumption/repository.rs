use chrono::{DateTime, Utc};
use contracts::projections::p001_energy_consumption::dto::EnergyConsumptionDto;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "p001_energy_consumption")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub device_ref: String,
    pub measured_at: chrono::DateTime<chrono::Utc>,
    pub value_kwh: f64,
    pub synthetic: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for EnergyConsumptionDto {
    fn from(m: Model) -> Self {
        EnergyConsumptionDto {
            id: m.id,
            device_ref: m.device_ref,
            measured_at: m.measured_at,
            value_kwh: m.value_kwh,
            synthetic: m.synthetic,
        }
    }
}

pub async fn insert(record: &EnergyConsumptionDto) -> Result<(), DbErr> {
    let db = get_connection();
    let active = ActiveModel {
        id: Set(record.id.clone()),
        device_ref: Set(record.device_ref.clone()),
        measured_at: Set(record.measured_at),
        value_kwh: Set(record.value_kwh),
        synthetic: Set(record.synthetic),
    };
    active.insert(db).await?;
    Ok(())
}

/// Записи регистра по устройству внутри периода (границы включительно)
pub async fn list_for_device_in_window(
    device_ref: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<EnergyConsumptionDto>, DbErr> {
    let db = get_connection();
    let models = Entity::find()
        .filter(Column::DeviceRef.eq(device_ref))
        .filter(Column::MeasuredAt.gte(from))
        .filter(Column::MeasuredAt.lte(to))
        .order_by_asc(Column::MeasuredAt)
        .all(db)
        .await?;
    Ok(models.into_iter().map(EnergyConsumptionDto::from).collect())
}
