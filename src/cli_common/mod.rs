//! Общий модуль для CLI
//!
//! Содержит общую функциональность командной строки каталога:
//! - Инициализация логирования
//! - Форматирование вывода
//! - Отображение прогресса сборки

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod args;
pub mod output;
pub mod progress;

pub use args::{CatalogArgs, CommonArgs, OutputArgs};
pub use output::{OutputFormat, OutputWriter};
pub use progress::{group_progress, spinner};

/// Инициализирует систему логирования; логи идут в stderr
pub fn init_logging(level: tracing::Level) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Выводит заголовок CLI
pub fn print_header(name: &str, version: &str, description: &str) {
    println!(
        "{} {} - {}",
        "🔧".blue(),
        name.bold().blue(),
        version.dimmed()
    );
    println!("{}\n", description.dimmed());
}

/// Выводит успешное завершение операции
pub fn print_success(message: &str) {
    println!("{} {}", "✅".green(), message.green());
}

/// Выводит предупреждение
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠️".yellow(), message.yellow());
}

/// Выводит ошибку
pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red());
}

/// Выводит информационное сообщение
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ️".blue(), message);
}

/// Создает директорию если она не существует
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Форматирует продолжительность в человекочитаемый вид
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{:03}s", secs, millis)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}
