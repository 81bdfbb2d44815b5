use super::repository;
use contracts::domain::a003_supervisor::aggregate::{Supervisor, SupervisorId};
use uuid::Uuid;

/// Создание нового супервизора
pub async fn create(name: String, email: String) -> anyhow::Result<SupervisorId> {
    let code = format!("SPV-{}", Uuid::new_v4());
    let mut aggregate = Supervisor::new_for_insert(code, name, email);

    // Валидация
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    // Before write
    aggregate.before_write();

    repository::insert(&aggregate).await?;
    Ok(aggregate.base.id)
}

/// Получение супервизора по ID
pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Supervisor>> {
    repository::get_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Получение супервизора по email
pub async fn get_by_email(email: &str) -> anyhow::Result<Option<Supervisor>> {
    repository::get_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Получение списка всех супервизоров
pub async fn list_all() -> anyhow::Result<Vec<Supervisor>> {
    repository::list_all()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}
