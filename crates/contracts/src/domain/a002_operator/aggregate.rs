use crate::domain::common::{
    AggregateId, AggregateRoot, BaseAggregate, EntityMetadata, EventStore, Origin,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================

/// Уникальный идентификатор оператора
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorId(pub Uuid);

impl OperatorId {
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

impl AggregateId for OperatorId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(OperatorId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Оператор — сотрудник, владеющий регламентными заданиями
///
/// Во внешних запросах оператор идентифицируется по email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    #[serde(flatten)]
    pub base: BaseAggregate<OperatorId>,

    /// Email (уникальный)
    pub email: String,
}

impl Operator {
    /// Создать нового оператора для вставки в БД
    pub fn new_for_insert(code: String, description: String, email: String) -> Self {
        Self {
            base: BaseAggregate::new(OperatorId::new_v4(), code, description),
            email,
        }
    }

    /// Валидация данных
    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Имя оператора не может быть пустым".into());
        }
        if !self.email.contains('@') {
            return Err("Некорректный email".into());
        }
        Ok(())
    }

    /// Хук перед записью
    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for Operator {
    type Id = OperatorId;

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
        "a002"
    }

    fn collection_name() -> &'static str {
        "operator"
    }

    fn element_name() -> &'static str {
        "Оператор"
    }

    fn list_name() -> &'static str {
        "Операторы"
    }

    fn origin() -> Origin {
        Origin::Self_
    }
}
