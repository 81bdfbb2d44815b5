use super::repository;
use crate::projections::p001_energy_consumption;
use contracts::domain::a005_report::aggregate::Report;
use contracts::domain::a005_report::request::ReportDraft;
use contracts::projections::p001_energy_consumption::dto::EnergyConsumptionDto;
use uuid::Uuid;

/// Итоги по записям регистра за период: суммарное потребление и,
/// при заданном пороге, число замеров выше порога
fn summarize(records: &[EnergyConsumptionDto], threshold: Option<f64>) -> (f64, Option<i64>) {
    let total: f64 = records.iter().map(|r| r.value_kwh).sum();
    let anomalies =
        threshold.map(|t| records.iter().filter(|r| r.value_kwh > t).count() as i64);
    (total, anomalies)
}

/// Формирование отчета по заявке
///
/// Показатели считаются по регистру потребления на момент вызова;
/// задание-инициатор передает только параметры периода.
pub async fn create(draft: ReportDraft) -> anyhow::Result<Report> {
    let code = format!("RPT-{}", Uuid::new_v4());
    let mut aggregate = Report::new_for_insert(
        code,
        draft.report_type,
        draft.title,
        draft.start_report_date,
        draft.end_report_date,
        draft.device_id,
        draft.operator_id,
        draft.supervisor_id,
        draft.threshold,
    );

    // Валидация
    aggregate
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;

    // Итоговые показатели по регистру потребления
    let records = p001_energy_consumption::service::list_for_device_in_window(
        &aggregate.device_id.0.to_string(),
        aggregate.start_report_date,
        aggregate.end_report_date,
    )
    .await?;
    let (total, anomalies) = summarize(&records, aggregate.threshold);
    aggregate.total_consumption_kwh = Some(total);
    aggregate.anomalies_count = anomalies;

    // Before write
    aggregate.before_write();

    repository::insert(&aggregate).await?;
    Ok(aggregate)
}

/// Получение отчетов по устройству
pub async fn list_for_device(device_id: Uuid) -> anyhow::Result<Vec<Report>> {
    repository::list_for_device(device_id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

/// Получение списка всех отчетов
pub async fn list_all() -> anyhow::Result<Vec<Report>> {
    repository::list_all()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(value_kwh: f64) -> EnergyConsumptionDto {
        EnergyConsumptionDto {
            id: Uuid::new_v4().to_string(),
            device_ref: "dev".into(),
            measured_at: Utc::now(),
            value_kwh,
            synthetic: false,
        }
    }

    #[test]
    fn test_summarize_totals_consumption() {
        let records = vec![record(1.5), record(2.5), record(6.0)];
        let (total, anomalies) = summarize(&records, None);
        assert_eq!(total, 10.0);
        assert_eq!(anomalies, None);
    }

    #[test]
    fn test_summarize_counts_values_above_threshold() {
        let records = vec![record(1.0), record(5.0), record(7.5), record(9.0)];
        let (_, anomalies) = summarize(&records, Some(5.0));
        // Порог строгий: значение, равное порогу, аномалией не считается
        assert_eq!(anomalies, Some(2));
    }

    #[test]
    fn test_summarize_empty_register() {
        let (total, anomalies) = summarize(&[], Some(3.0));
        assert_eq!(total, 0.0);
        assert_eq!(anomalies, Some(0));
    }
}
