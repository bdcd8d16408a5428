//! Общие аргументы командной строки

use clap::Parser;
use std::path::PathBuf;

use super::output::OutputFormat;

/// Общие аргументы для всех команд
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, table, csv)
    #[arg(long, global = true, default_value = "text")]
    pub format: String,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Pretty print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

/// Где искать установку, конфигурацию и каталог
#[derive(Parser, Debug, Clone)]
pub struct CatalogArgs {
    /// Installation root (defaults to $MESA_DIR)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Catalog config file, TOML or YAML
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog directory (defaults to the one configured under the root)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,
}

/// Аргументы для работы с выводом
#[derive(Parser, Debug, Clone)]
pub struct OutputArgs {
    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommonArgs {
    /// Определяет уровень логирования на основе флагов
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }

    /// Проверяет, нужно ли выводить информацию
    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    pub fn output_format(&self) -> anyhow::Result<OutputFormat> {
        self.format.parse()
    }

    /// Статусные сообщения не смешиваются с JSON на stdout
    pub fn shows_status(&self) -> bool {
        self.should_print() && !matches!(self.output_format(), Ok(OutputFormat::Json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let args = CommonArgs {
            verbose: true,
            format: "json".to_string(),
            quiet: false,
            pretty: false,
        };
        assert_eq!(args.log_level(), tracing::Level::DEBUG);
        assert_eq!(args.output_format().unwrap(), OutputFormat::Json);
        assert!(args.should_print());
        assert!(!args.shows_status());

        let table = CommonArgs { format: "table".to_string(), ..args.clone() };
        assert!(table.shows_status());

        let quiet = CommonArgs { quiet: true, ..args };
        assert_eq!(quiet.log_level(), tracing::Level::ERROR);
        assert!(!quiet.should_print());
    }
}
