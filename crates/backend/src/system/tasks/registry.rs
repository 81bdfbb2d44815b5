use contracts::enums::task_kind::TaskKind;
use std::collections::HashMap;
use std::sync::Arc;

use super::manager::TaskManager;

/// Реестр менеджеров регламентных заданий
///
/// Позволяет регистрировать профильные реализации TaskManager и
/// получать их по виду задания. Порядок регистрации сохраняется: в нем
/// же конкатенируются списки в `get_all`.
pub struct TaskManagerRegistry {
    managers: HashMap<TaskKind, Arc<dyn TaskManager>>,
    order: Vec<TaskKind>,
}

impl TaskManagerRegistry {
    pub fn new() -> Self {
        Self {
            managers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Регистрирует менеджер задач
    pub fn register<T: TaskManager + 'static>(&mut self, manager: T) {
        let kind = manager.kind();
        if self.managers.insert(kind, Arc::new(manager)).is_none() {
            self.order.push(kind);
        }
    }

    /// Возвращает менеджер по виду задания
    pub fn get(&self, kind: TaskKind) -> Option<Arc<dyn TaskManager>> {
        self.managers.get(&kind).cloned()
    }

    /// Виды заданий в порядке регистрации
    pub fn kinds(&self) -> &[TaskKind] {
        &self.order
    }
}

impl Default for TaskManagerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
