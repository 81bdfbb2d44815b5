use contracts::enums::frequency::Frequency;
use contracts::enums::task_kind::TaskKind;
use contracts::system::tasks::aggregate::{ScheduledTask, TaskAssignee};
use contracts::system::tasks::request::{CreateTaskDto, UpdateTaskDto};
use std::sync::Arc;
use tracing::info;

use super::error::TaskError;
use super::manager::parse_wire_date;
use super::ports::{Directory, JobRuntime, TaskStore};
use super::registry::TaskManagerRegistry;

/// Диспетчер регламентных заданий
///
/// Единая точка входа CRUD-поверхности: по дискриминатору вида запрос
/// уходит ровно в один профильный менеджер, общий клей (разрешение
/// ссылок, сохранение, регистрация в рантайме) — здесь. Хранилище и
/// рантайм передаются при конструировании; сборка происходит один раз
/// на старте процесса.
pub struct TaskDispatchService {
    store: Arc<dyn TaskStore>,
    runtime: Arc<dyn JobRuntime>,
    registry: Arc<TaskManagerRegistry>,
    directory: Arc<dyn Directory>,
}

impl TaskDispatchService {
    pub fn new(
        store: Arc<dyn TaskStore>,
        runtime: Arc<dyn JobRuntime>,
        registry: Arc<TaskManagerRegistry>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            store,
            runtime,
            registry,
            directory,
        }
    }

    /// Все задания: конкатенация по видам в порядке регистрации
    /// менеджеров (не глобальная сортировка по датам)
    pub async fn get_all(&self) -> Result<Vec<ScheduledTask>, TaskError> {
        let mut tasks = Vec::new();
        for kind in self.registry.kinds() {
            tasks.extend(self.store.list_by_kind(*kind).await?);
        }
        Ok(tasks)
    }

    /// Задание по публичному идентификатору
    pub async fn get_by_public_id(
        &self,
        public_id: &str,
    ) -> Result<Option<ScheduledTask>, TaskError> {
        self.store.get_by_public_id(public_id).await
    }

    /// Создание задания
    ///
    /// Вся валидация — до первого обращения к хранилищу; частично
    /// созданных заданий не бывает. Успешное сохранение сразу же
    /// регистрирует периодическое срабатывание.
    pub async fn create(&self, dto: CreateTaskDto) -> Result<ScheduledTask, TaskError> {
        let kind = TaskKind::from_code(&dto.task_type)
            .ok_or_else(|| TaskError::UnsupportedKind(dto.task_type.clone()))?;
        let manager = self
            .registry
            .get(kind)
            .ok_or_else(|| TaskError::UnsupportedKind(dto.task_type.clone()))?;

        // Общие обязательные поля
        let start_raw = dto
            .start_date
            .as_deref()
            .ok_or_else(|| TaskError::missing_field("startDate"))?;
        let frequency_raw = dto
            .frequency
            .as_deref()
            .ok_or_else(|| TaskError::missing_field("frequency"))?;
        let device_name = dto
            .device_name
            .as_deref()
            .ok_or_else(|| TaskError::missing_field("deviceName"))?;

        // Поля вида
        manager.check_attributes(&dto)?;

        let frequency = Frequency::from_code(frequency_raw).map_err(TaskError::InvalidFrequency)?;
        let start_date = parse_wire_date("startDate", start_raw)?;
        let end_date = dto
            .end_date
            .as_deref()
            .map(|value| parse_wire_date("endDate", value))
            .transpose()?;

        let assignee = self.resolve_assignee(&dto).await?;
        let device = self
            .directory
            .device_by_name(device_name)
            .await?
            .ok_or_else(|| TaskError::validation(format!("unknown device: {}", device_name)))?;

        let details = manager.build_details(&dto)?;
        let description = dto
            .description
            .clone()
            .unwrap_or_else(|| kind.display_name().to_string());

        let mut task = ScheduledTask::new_for_insert(
            description,
            device.base.id,
            assignee,
            frequency,
            start_date,
            end_date,
            details,
        );
        task.validate().map_err(TaskError::Validation)?;
        task.before_write();

        self.store.insert(&task).await?;
        self.runtime
            .schedule(task.public_id(), task.refire_interval_ms, task.clone())
            .await?;

        info!("Created task {} ({})", task.public_id(), kind.code());
        Ok(task)
    }

    /// Изменение задания
    ///
    /// Маршрутизация — по публичному идентификатору: все виды живут в
    /// одном хранилище и запись сама знает свой вид. Дискриминатор в
    /// запросе необязателен, но указанный обязан совпасть.
    pub async fn update(&self, dto: UpdateTaskDto) -> Result<ScheduledTask, TaskError> {
        let mut task = self
            .store
            .get_by_public_id(&dto.public_id)
            .await?
            .ok_or_else(|| TaskError::NotFound(dto.public_id.clone()))?;

        if let Some(tag) = dto.task_type.as_deref() {
            let declared = TaskKind::from_code(tag)
                .ok_or_else(|| TaskError::UnsupportedKind(tag.to_string()))?;
            if declared != task.kind() {
                return Err(TaskError::validation(format!(
                    "task {} is {}, not {}",
                    dto.public_id,
                    task.kind(),
                    declared
                )));
            }
        }

        let manager = self
            .registry
            .get(task.kind())
            .ok_or_else(|| TaskError::UnsupportedKind(task.kind().code().to_string()))?;

        // Общие поля: отсутствующее в запросе — не трогаем
        if let Some(value) = dto.description.clone() {
            task.base.description = value;
        }
        if let Some(value) = dto.end_date.as_deref() {
            // Перенос даты окончания в прошлое допустим: следующее
            // срабатывание станет последним
            task.end_date = Some(parse_wire_date("endDate", value)?);
        }
        let mut frequency_changed = false;
        if let Some(value) = dto.frequency.as_deref() {
            let frequency =
                Frequency::from_code(value).map_err(TaskError::InvalidFrequency)?;
            if frequency != task.frequency {
                task.set_frequency(frequency);
                frequency_changed = true;
            }
        }

        // Поля вида
        let mut details = task.details.clone();
        manager.apply_update(&mut details, &dto)?;
        task.details = details;

        task.validate().map_err(TaskError::Validation)?;
        task.before_write();
        self.store.update(&task).await?;

        // Новый интервал — новая регистрация под тем же ключом
        if frequency_changed {
            self.runtime
                .schedule(task.public_id(), task.refire_interval_ms, task.clone())
                .await?;
        }

        info!("Updated task {}", task.public_id());
        Ok(task)
    }

    /// Удаление задания
    ///
    /// Хранилище толерантно к отсутствию записи; регистрация в рантайме
    /// снимается в любом случае — иначе задание продолжит срабатывать
    /// после удаления.
    pub async fn delete(&self, public_id: &str) -> Result<Option<ScheduledTask>, TaskError> {
        let deleted = self.store.delete_by_public_id(public_id).await?;
        self.runtime.cancel(public_id).await?;

        if deleted.is_some() {
            info!("Deleted task {}", public_id);
        }
        Ok(deleted)
    }

    async fn resolve_assignee(&self, dto: &CreateTaskDto) -> Result<TaskAssignee, TaskError> {
        match (dto.operator_email.as_deref(), dto.supervisor_email.as_deref()) {
            (Some(_), Some(_)) => Err(TaskError::validation(
                "task owner must be exactly one of operatorEmail or supervisorEmail",
            )),
            (Some(email), None) => {
                let operator = self
                    .directory
                    .operator_by_email(email)
                    .await?
                    .ok_or_else(|| {
                        TaskError::validation(format!("unknown operator: {}", email))
                    })?;
                Ok(TaskAssignee::Operator(operator.base.id))
            }
            (None, Some(email)) => {
                let supervisor = self
                    .directory
                    .supervisor_by_email(email)
                    .await?
                    .ok_or_else(|| {
                        TaskError::validation(format!("unknown supervisor: {}", email))
                    })?;
                Ok(TaskAssignee::Supervisor(supervisor.base.id))
            }
            (None, None) => Err(TaskError::validation(
                "task must be owned by an operator or a supervisor",
            )),
        }
    }
}
