use chrono::Utc;
use contracts::domain::a002_operator::aggregate::{Operator, OperatorId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_operator")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub email: String,
    pub is_deleted: bool,
    pub is_posted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Operator {
    fn from(m: Model) -> Self {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            is_posted: m.is_posted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());

        Operator {
            base: BaseAggregate::with_metadata(
                OperatorId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            email: m.email,
        }
    }
}

fn to_active_model(operator: &Operator) -> ActiveModel {
    ActiveModel {
        id: Set(operator.base.id.0.to_string()),
        code: Set(operator.base.code.clone()),
        description: Set(operator.base.description.clone()),
        comment: Set(operator.base.comment.clone()),
        email: Set(operator.email.clone()),
        is_deleted: Set(operator.base.metadata.is_deleted),
        is_posted: Set(operator.base.metadata.is_posted),
        created_at: Set(Some(operator.base.metadata.created_at)),
        updated_at: Set(Some(operator.base.metadata.updated_at)),
        version: Set(operator.base.metadata.version),
    }
}

pub async fn list_all() -> Result<Vec<Operator>, DbErr> {
    let db = get_connection();
    let models = Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Code)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Operator::from).collect())
}

pub async fn get_by_id(id: Uuid) -> Result<Option<Operator>, DbErr> {
    let db = get_connection();
    let model = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(model.map(Operator::from))
}

pub async fn get_by_email(email: &str) -> Result<Option<Operator>, DbErr> {
    let db = get_connection();
    let model = Entity::find()
        .filter(Column::Email.eq(email))
        .filter(Column::IsDeleted.eq(false))
        .one(db)
        .await?;
    Ok(model.map(Operator::from))
}

pub async fn insert(operator: &Operator) -> Result<(), DbErr> {
    let db = get_connection();
    to_active_model(operator).insert(db).await?;
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
