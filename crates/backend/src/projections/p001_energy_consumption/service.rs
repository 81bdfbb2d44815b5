use super::repository;
use chrono::{DateTime, Utc};
use contracts::domain::a001_device::aggregate::Device;
use contracts::projections::p001_energy_consumption::dto::EnergyConsumptionDto;
use rand::Rng;
use uuid::Uuid;

/// Верхняя граница синтетического замера для устройств без паспортного
/// максимума, кВт·ч
const DEFAULT_MAX_KWH: f64 = 10.0;

/// Сгенерировать значение синтетического замера
///
/// Значение придумывает регистр, а не планировщик: задания мониторинга
/// лишь просят "снять показание".
fn generate_value_kwh(max_kwh: f64) -> f64 {
    let mut rng = rand::thread_rng();
    rng.gen_range(0.0..max_kwh)
}

/// Создать синтетический замер потребления для устройства
pub async fn record_synthetic(device: &Device) -> anyhow::Result<EnergyConsumptionDto> {
    let max_kwh = device.max_consumption_kwh.unwrap_or(DEFAULT_MAX_KWH);
    let record = EnergyConsumptionDto {
        id: Uuid::new_v4().to_string(),
        device_ref: device.base.id.0.to_string(),
        measured_at: Utc::now(),
        value_kwh: generate_value_kwh(max_kwh),
        synthetic: true,
    };

    repository::insert(&record).await?;
    Ok(record)
}

/// Записи регистра по устройству внутри периода
pub async fn list_for_device_in_window(
    device_ref: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> anyhow::Result<Vec<EnergyConsumptionDto>> {
    repository::list_for_device_in_window(device_ref, from, to)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_value_stays_in_bounds() {
        for _ in 0..100 {
            let value = generate_value_kwh(5.0);
            assert!((0.0..5.0).contains(&value));
        }
    }
}
