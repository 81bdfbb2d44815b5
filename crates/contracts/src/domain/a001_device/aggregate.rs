use crate::domain::common::{
    AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, EventStore, Origin,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор устройства
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub Uuid);

impl DeviceId {
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

impl AggregateId for DeviceId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(DeviceId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Устройство (точка учета энергопотребления)
///
/// Регламентные задания ссылаются на устройство по уникальному
/// техническому имени (`name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(flatten)]
    pub base: BaseAggregate<DeviceId>,

    /// Уникальное техническое имя (например, "Device-Monitorize")
    pub name: String,

    /// Место установки
    pub location: Option<String>,

    /// Паспортное максимальное потребление, кВт·ч за интервал снятия
    #[serde(rename = "maxConsumptionKwh")]
    pub max_consumption_kwh: Option<f64>,
}

impl Device {
    /// Создать новое устройство для вставки в БД
    pub fn new_for_insert(
        code: String,
        description: String,
        name: String,
        location: Option<String>,
        max_consumption_kwh: Option<f64>,
        comment: Option<String>,
    ) -> Self {
        let mut base = BaseAggregate::new(DeviceId::new_v4(), code, description);
        base.comment = comment;

        Self {
            base,
            name,
            location,
            max_consumption_kwh,
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Имя устройства не может быть пустым".into());
        }
        if self.base.description.trim().is_empty() {
            return Err("Описание не может быть пустым".into());
        }
        if let Some(max) = self.max_consumption_kwh {
            if max <= 0.0 {
                return Err("Максимальное потребление должно быть положительным".into());
            }
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Device {
    type Id = DeviceId;

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
        "a001"
    }

    fn collection_name() -> &'static str {
        "device"
    }

    fn element_name() -> &'static str {
        "Устройство"
    }

    fn list_name() -> &'static str {
        "Устройства"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}
