use crate::domain::a001_device::aggregate::DeviceId;
use crate::domain::a002_operator::aggregate::OperatorId;
use crate::domain::a003_supervisor::aggregate::SupervisorId;
use crate::domain::common::{
    AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, EventStore, Origin,
};
use crate::enums::report_type::ReportType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор отчета
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub Uuid);

impl ReportId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ReportId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ReportId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Отчет, сформированный срабатыванием регламентного задания
///
/// Итоговые показатели (`total_consumption_kwh`, `anomalies_count`)
/// считаются сервисом отчетов по записям регистра потребления на
/// момент формирования.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    #[serde(flatten)]
    pub base: BaseAggregate<ReportId>,

    #[serde(rename = "reportType")]
    pub report_type: ReportType,

    /// Заголовок отчета
    pub title: String,

    /// Начало отчетного периода
    #[serde(rename = "startReportDate")]
    pub start_report_date: DateTime<Utc>,

    /// Конец отчетного периода
    #[serde(rename = "endReportDate")]
    pub end_report_date: DateTime<Utc>,

    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,

    #[serde(rename = "operatorId")]
    pub operator_id: Option<OperatorId>,

    #[serde(rename = "supervisorId")]
    pub supervisor_id: Option<SupervisorId>,

    /// Порог аномалии, кВт·ч (только для отчетов по аномалиям)
    pub threshold: Option<f64>,

    /// Суммарное потребление за период, кВт·ч
    #[serde(rename = "totalConsumptionKwh")]
    pub total_consumption_kwh: Option<f64>,

    /// Число замеров выше порога за период
    #[serde(rename = "anomaliesCount")]
    pub anomalies_count: Option<i64>,

    /// Момент формирования
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Создать новый отчет для вставки в БД
    #[allow(clippy::too_many_arguments)]
    pub fn new_for_insert(
        code: String,
        report_type: ReportType,
        title: String,
        start_report_date: DateTime<Utc>,
        end_report_date: DateTime<Utc>,
        device_id: DeviceId,
        operator_id: Option<OperatorId>,
        supervisor_id: Option<SupervisorId>,
        threshold: Option<f64>,
    ) -> Self {
        Self {
            base: BaseAggregate::new(ReportId::new_v4(), code, title.clone()),
            report_type,
            title,
            start_report_date,
            end_report_date,
            device_id,
            operator_id,
            supervisor_id,
            threshold,
            total_consumption_kwh: None,
            anomalies_count: None,
            generated_at: Utc::now(),
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Заголовок отчета не может быть пустым".into());
        }
        if self.end_report_date < self.start_report_date {
            return Err("Конец отчетного периода раньше его начала".into());
        }
        if self.operator_id.is_none() && self.supervisor_id.is_none() {
            return Err("Отчет должен ссылаться на оператора или супервизора".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Report {
    type Id = ReportId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn events(&self) -> &EventStore {
        &self.base.events
    }

    fn events_mut(&mut self) -> &mut EventStore {
        &mut self.base.events
    }

    fn aggregate_index() -> &'static str {
        "a005"
    }

    fn collection_name() -> &'static str {
        "report"
    }

    fn element_name() -> &'static str {
        "Отчет"
    }

    fn list_name() -> &'static str {
        "Отчеты"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}
