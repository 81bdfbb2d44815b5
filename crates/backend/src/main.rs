pub mod domain;
pub mod projections;
pub mod shared;
pub mod system;

use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Логи — до всего остального
    system::tracing::initialize()?;

    // Конфигурация
    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config)?;

    // База данных
    shared::data::db::initialize_database(db_path.to_str()).await?;

    // Планировщик регламентных заданий: реестр менеджеров, рантайм,
    // восстановление регистраций по сохраненным заданиям
    let engine = system::tasks::initialization::initialize_scheduled_tasks(&config).await?;

    let tasks = engine.service.get_all().await?;
    info!("Scheduler started with {} registered task(s)", tasks.len());

    // Процесс живет, пока живут фоновые задания
    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested, stopping");

    Ok(())
}
