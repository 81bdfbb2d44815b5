use anyhow::Result;
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Логгер срабатываний регламентных заданий
///
/// На каждое задание — свой лог-файл, ключ файла — публичный
/// идентификатор задания.
pub struct TaskLogger {
    log_dir: String,
}

impl TaskLogger {
    pub fn new(log_dir: &str) -> Self {
        Self {
            log_dir: log_dir.to_string(),
        }
    }

    /// Создает директорию для логов, если она не существует
    fn ensure_log_dir_exists(&self) -> Result<()> {
        fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    /// Возвращает путь к лог-файлу задания
    pub fn get_log_file_path(&self, public_id: &str) -> String {
        format!("{}/{}.log", self.log_dir, public_id)
    }

    /// Записывает сообщение в лог-файл задания
    pub fn write_log(&self, public_id: &str, message: &str) -> Result<()> {
        self.ensure_log_dir_exists()?;
        let file_path = self.get_log_file_path(public_id);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        writeln!(file, "[{}] {}", timestamp, message)?;
        Ok(())
    }

    /// Читает содержимое лог-файла задания
    pub fn read_log(&self, public_id: &str) -> Result<String> {
        let file_path = self.get_log_file_path(public_id);
        if Path::new(&file_path).exists() {
            Ok(fs::read_to_string(&file_path)?)
        } else {
            Ok(format!("Log file for task {} not found.", public_id))
        }
    }

    /// Удаляет лог-файл задания
    pub fn delete_log(&self, public_id: &str) -> Result<()> {
        let file_path = self.get_log_file_path(public_id);
        if Path::new(&file_path).exists() {
            fs::remove_file(&file_path)?;
        }
        Ok(())
    }
}
