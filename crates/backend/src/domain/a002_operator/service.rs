use super::repository;
use contracts::domain::a002_operator::aggregate::{Operator, OperatorId};
use uuid::Uuid;

/// Создание нового оператора
pub async fn create(name: String, email: String) -> anyhow::Result<OperatorId> {
    let code = format!("OPR-{}", Uuid::new_v4());
    let mut aggregate = Operator::new_for_insert(code, name, email);

    // Валидация
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    // Before write
    aggregate.before_write();

    repository::insert(&aggregate).await?;
    Ok(aggregate.base.id)
}

/// Получение оператора по ID
pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Operator>> {
    repository::get_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Получение оператора по email
pub async fn get_by_email(email: &str) -> anyhow::Result<Option<Operator>> {
    repository::get_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Получение списка всех операторов
pub async fn list_all() -> anyhow::Result<Vec<Operator>> {
    repository::list_all()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}
