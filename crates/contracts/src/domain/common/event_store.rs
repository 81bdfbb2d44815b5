use serde::{Deserialize, Serialize};

/// Хранилище доменных событий агрегата
///
/// Зарезервировано под журнал изменений (кто и когда менял задание,
/// когда сработало); пока события никуда не пишутся.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventStore {
    // Пока пустая структура, будет расширена позже
    _placeholder: (),
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }
}
