use async_trait::async_trait;
use contracts::system::tasks::aggregate::ScheduledTask;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::error::TaskError;
use super::ports::{FireDecision, JobHandler, JobRuntime};

struct JobEntry {
    handle: JoinHandle<()>,
    /// Кеш атрибутов задания на момент регистрации; не источник истины
    payload: ScheduledTask,
}

/// Рантайм периодических заданий поверх tokio
///
/// На каждую регистрацию — своя фоновая задача с tokio::time::interval:
/// первое срабатывание немедленно, далее строго последовательно внутри
/// одного ключа (цикл ждет завершения обработчика) и конкурентно между
/// ключами. Медленное срабатывание одного задания не задерживает
/// остальные.
pub struct TokioJobRuntime {
    handler: Arc<dyn JobHandler>,
    jobs: Arc<Mutex<HashMap<String, JobEntry>>>,
}

impl TokioJobRuntime {
    pub fn new(handler: Arc<dyn JobHandler>) -> Self {
        Self {
            handler,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Число активных регистраций
    pub async fn scheduled_count(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// Кеш атрибутов задания, захваченный при регистрации
    pub async fn cached_payload(&self, key: &str) -> Option<ScheduledTask> {
        self.jobs.lock().await.get(key).map(|e| e.payload.clone())
    }
}

#[async_trait]
impl JobRuntime for TokioJobRuntime {
    async fn schedule(
        &self,
        key: &str,
        interval_ms: i64,
        payload: ScheduledTask,
    ) -> Result<(), TaskError> {
        if interval_ms <= 0 {
            return Err(TaskError::validation(format!(
                "refire interval must be positive, got {}",
                interval_ms
            )));
        }

        let mut jobs = self.jobs.lock().await;

        // Повторная регистрация заменяет старую, двойных срабатываний
        // одного ключа не бывает
        if let Some(old) = jobs.remove(key) {
            old.handle.abort();
            debug!("Replacing job registration for {}", key);
        }

        let handler = Arc::clone(&self.handler);
        let jobs_ref = Arc::clone(&self.jobs);
        let job_key = key.to_string();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(std::time::Duration::from_millis(interval_ms as u64));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if handler.on_fire(&job_key).await == FireDecision::Expire {
                    jobs_ref.lock().await.remove(&job_key);
                    debug!("Job {} expired, registration removed", job_key);
                    break;
                }
            }
        });

        jobs.insert(key.to_string(), JobEntry { handle, payload });
        info!("Scheduled job {} every {} ms", key, interval_ms);
        Ok(())
    }

    async fn cancel(&self, key: &str) -> Result<bool, TaskError> {
        match self.jobs.lock().await.remove(key) {
            Some(entry) => {
                entry.handle.abort();
                info!("Cancelled job {}", key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn is_scheduled(&self, key: &str) -> bool {
        self.jobs.lock().await.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_device::aggregate::DeviceId;
    use contracts::domain::a002_operator::aggregate::OperatorId;
    use contracts::enums::frequency::Frequency;
    use contracts::system::tasks::aggregate::{TaskAssignee, TaskDetails};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn payload() -> ScheduledTask {
        ScheduledTask::new_for_insert(
            "Мониторинг".into(),
            DeviceId::new_v4(),
            TaskAssignee::Operator(OperatorId::new_v4()),
            Frequency::Daily,
            chrono::Utc::now(),
            None,
            TaskDetails::MonitorizeConsumption { threshold: 5.0 },
        )
    }

    /// Обработчик, считающий срабатывания; истекает после `expire_after`
    /// срабатываний (0 — никогда)
    struct CountingHandler {
        fires: AtomicU32,
        expire_after: u32,
    }

    impl CountingHandler {
        fn new(expire_after: u32) -> Self {
            Self {
                fires: AtomicU32::new(0),
                expire_after,
            }
        }

        fn fires(&self) -> u32 {
            self.fires.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobHandler for CountingHandler {
        async fn on_fire(&self, _key: &str) -> FireDecision {
            let n = self.fires.fetch_add(1, Ordering::SeqCst) + 1;
            if self.expire_after > 0 && n >= self.expire_after {
                FireDecision::Expire
            } else {
                FireDecision::Reschedule
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_immediately_then_on_interval() {
        let handler = Arc::new(CountingHandler::new(0));
        let runtime = TokioJobRuntime::new(handler.clone());

        runtime.schedule("TSK-a", 1_000, payload()).await.unwrap();

        // Первое срабатывание — сразу после регистрации
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handler.fires(), 1);

        // Плюс два полных интервала
        time::sleep(Duration::from_millis(2_000)).await;
        assert_eq!(handler.fires(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_future_fires() {
        let handler = Arc::new(CountingHandler::new(0));
        let runtime = TokioJobRuntime::new(handler.clone());

        runtime.schedule("TSK-b", 1_000, payload()).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handler.fires(), 1);

        assert!(runtime.cancel("TSK-b").await.unwrap());
        assert!(!runtime.is_scheduled("TSK-b").await);

        time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(handler.fires(), 1);

        // Повторная отмена — регистрации уже нет
        assert!(!runtime.cancel("TSK-b").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_decision_removes_registration() {
        let handler = Arc::new(CountingHandler::new(1));
        let runtime = TokioJobRuntime::new(handler.clone());

        runtime.schedule("TSK-c", 1_000, payload()).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;

        assert_eq!(handler.fires(), 1);
        assert!(!runtime.is_scheduled("TSK-c").await);

        // Второго срабатывания не происходит
        time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(handler.fires(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_registration() {
        let handler = Arc::new(CountingHandler::new(0));
        let runtime = TokioJobRuntime::new(handler.clone());

        runtime.schedule("TSK-d", 1_000, payload()).await.unwrap();
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handler.fires(), 1);

        // Замена регистрации: старый таймер снят, новый — с большим
        // интервалом, срабатывает немедленно и далее раз в 10 секунд
        runtime.schedule("TSK-d", 10_000, payload()).await.unwrap();
        time::sleep(Duration::from_millis(3_000)).await;
        assert_eq!(handler.fires(), 2);

        assert_eq!(runtime.scheduled_count().await, 1);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_interval() {
        let runtime = TokioJobRuntime::new(Arc::new(CountingHandler::new(0)));
        let err = runtime.schedule("TSK-e", 0, payload()).await.unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
    }
}
