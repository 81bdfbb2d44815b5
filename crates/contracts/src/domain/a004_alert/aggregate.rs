use crate::domain::a001_device::aggregate::DeviceId;
use crate::domain::a002_operator::aggregate::OperatorId;
use crate::domain::a003_supervisor::aggregate::SupervisorId;
use crate::domain::common::{
    AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, EventStore, Origin,
};
use crate::enums::alert_priority::AlertPriority;
use crate::enums::alert_type::AlertType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор оповещения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(pub Uuid);

impl AlertId {
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

impl AggregateId for AlertId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(AlertId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Оповещение, созданное срабатыванием регламентного задания
///
/// Планировщик только создает оповещения; дальнейший жизненный цикл
/// (просмотр, разрешение) — забота CRUD-контура.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(flatten)]
    pub base: BaseAggregate<AlertId>,

    /// Текст оповещения
    pub message: String,

    #[serde(rename = "alertType")]
    pub alert_type: AlertType,

    pub priority: AlertPriority,

    /// Разрешено ли оповещение
    pub resolved: bool,

    #[serde(rename = "deviceId")]
    pub device_id: DeviceId,

    #[serde(rename = "operatorId")]
    pub operator_id: Option<OperatorId>,

    #[serde(rename = "supervisorId")]
    pub supervisor_id: Option<SupervisorId>,
}

impl Alert {
    /// Создать новое оповещение для вставки в БД
    pub fn new_for_insert(
        code: String,
        message: String,
        alert_type: AlertType,
        priority: AlertPriority,
        device_id: DeviceId,
        operator_id: Option<OperatorId>,
        supervisor_id: Option<SupervisorId>,
    ) -> Self {
        Self {
            base: BaseAggregate::new(AlertId::new_v4(), code, message.clone()),
            message,
            alert_type,
            priority,
            resolved: false,
            device_id,
            operator_id,
            supervisor_id,
        }
    }

    /// Перевести оповещение в состояние "разрешено"
    pub fn resolve(&mut self) {
        self.resolved = true;
        self.base.touch();
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("Текст оповещения не может быть пустым".into());
        }
        if self.operator_id.is_none() && self.supervisor_id.is_none() {
            return Err("Оповещение должно ссылаться на оператора или супервизора".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Alert {
    type Id = AlertId;

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
        "a004"
    }

    fn collection_name() -> &'static str {
        "alert"
    }

    fn element_name() -> &'static str {
        "Оповещение"
    }

    fn list_name() -> &'static str {
        "Оповещения"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}
