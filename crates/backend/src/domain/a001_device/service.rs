use super::repository;
use contracts::domain::a001_device::aggregate::{Device, DeviceId};
use uuid::Uuid;

/// Создание нового устройства
pub async fn create(
    name: String,
    description: String,
    location: Option<String>,
    max_consumption_kwh: Option<f64>,
) -> anyhow::Result<DeviceId> {
    let code = format!("DEV-{}", Uuid::new_v4());
    let mut aggregate =
        Device::new_for_insert(code, description, name, location, max_consumption_kwh, None);

    // Валидация
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    // Before write
    aggregate.before_write();

    // Сохранение через repository
    repository::insert(&aggregate).await?;
    Ok(aggregate.base.id)
}

/// Получение устройства по ID
pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<Device>> {
    repository::get_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Получение устройства по техническому имени
pub async fn get_by_name(name: &str) -> anyhow::Result<Option<Device>> {
    repository::get_by_name(name)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Получение списка всех устройств
pub async fn list_all() -> anyhow::Result<Vec<Device>> {
    repository::list_all()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Мягкое удаление устройства
pub async fn delete(id: Uuid) -> anyhow::Result<()> {
    repository::soft_delete(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}
