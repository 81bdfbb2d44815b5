use super::repository;
use contracts::domain::a004_alert::aggregate::Alert;
use contracts::domain::a004_alert::request::AlertDraft;
use uuid::Uuid;

/// Создание оповещения по заявке
///
/// Единственная операция, которую планировщик вызывает у этого
/// сервиса при срабатывании задания.
pub async fn create(draft: AlertDraft) -> anyhow::Result<Alert> {
    let code = format!("ALR-{}", Uuid::new_v4());
    let mut aggregate = Alert::new_for_insert(
        code,
        draft.message,
        draft.alert_type,
        draft.priority,
        draft.device_id,
        draft.operator_id,
        draft.supervisor_id,
    );

    // Валидация
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    // Before write
    aggregate.before_write();

    repository::insert(&aggregate).await?;
    Ok(aggregate)
}

/// Перевод оповещения в состояние "разрешено"
pub async fn resolve(id: Uuid) -> anyhow::Result<()> {
    let mut aggregate = repository::get_by_id(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Alert not found"))?;

    aggregate.resolve();
    repository::update(&aggregate).await?;
    Ok(())
}

/// Получение оповещений по устройству
pub async fn list_for_device(device_id: Uuid) -> anyhow::Result<Vec<Alert>> {
    repository::list_for_device(device_id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Получение списка всех оповещений
pub async fn list_all() -> anyhow::Result<Vec<Alert>> {
    repository::list_all()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}
