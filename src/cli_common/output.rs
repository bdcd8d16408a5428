//! Модуль для форматирования и вывода результатов

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::catalog::ParameterRecord;

/// Формат вывода результатов
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(anyhow::anyhow!("Unknown output format: {}", s)),
        }
    }
}

/// Writer для вывода результатов
pub struct OutputWriter {
    writer: Box<dyn Write>,
    format: OutputFormat,
    pretty: bool,
}

impl OutputWriter {
    /// Создает writer для stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self {
            writer: Box::new(io::stdout()),
            format,
            pretty: false,
        }
    }

    /// Создает writer для файла
    pub fn file(path: &Path, format: OutputFormat) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Box::new(file),
            format,
            pretty: false,
        })
    }

    /// Включает pretty-печать для JSON
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Записывает сериализуемый объект
    pub fn write_object<T: Serialize>(&mut self, obj: &T) -> Result<()> {
        let json = if self.pretty || self.format != OutputFormat::Json {
            serde_json::to_string_pretty(obj)?
        } else {
            serde_json::to_string(obj)?
        };
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Записывает строку
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)?;
        Ok(())
    }

    /// Записывает заголовок
    pub fn write_header(&mut self, header: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.writer, "\n{}", header.bold().blue())?;
                writeln!(self.writer, "{}", "=".repeat(header.chars().count()).blue())?;
            }
            _ => {
                writeln!(self.writer, "{}", header)?;
            }
        }
        Ok(())
    }

    /// Полная карточка параметра
    pub fn write_record(&mut self, record: &ParameterRecord) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.write_object(record);
        }
        self.write_header(&format!("{} ({})", record.name(), record.group))?;
        writeln!(self.writer, "  dtype:   {}", record.dtype())?;
        writeln!(self.writer, "  default: {}", record.default.to_fortran())?;
        writeln!(self.writer, "  dim:     {}", record.dim)?;
        writeln!(self.writer, "  order:   {}", record.order)?;
        writeln!(self.writer)?;
        for line in record.doc.lines() {
            writeln!(self.writer, "  {}", line.trim_end().dimmed())?;
        }
        Ok(())
    }

    /// Список параметров в виде таблицы (или JSON-массива)
    pub fn write_records(&mut self, records: &[&ParameterRecord]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.write_object(&records);
        }
        let rows = records
            .iter()
            .map(|r| {
                vec![
                    r.name().to_string(),
                    r.group.clone(),
                    r.dtype().to_string(),
                    r.default.to_fortran(),
                ]
            })
            .collect();
        self.write_table(&["name", "group", "dtype", "default"], rows)
    }

    /// Записывает таблицу
    pub fn write_table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        match self.format {
            OutputFormat::Table | OutputFormat::Text => {
                // Вычисляем ширину колонок
                let mut widths = headers.iter().map(|h| h.len()).collect::<Vec<_>>();
                for row in &rows {
                    for (i, cell) in row.iter().enumerate() {
                        if i < widths.len() {
                            widths[i] = widths[i].max(cell.chars().count());
                        }
                    }
                }

                for (i, header) in headers.iter().enumerate() {
                    if i > 0 {
                        write!(self.writer, " │ ")?;
                    }
                    write!(self.writer, "{}", format!("{:width$}", header, width = widths[i]).bold())?;
                }
                writeln!(self.writer)?;

                for (i, width) in widths.iter().enumerate() {
                    if i > 0 {
                        write!(self.writer, "─┼─")?;
                    }
                    write!(self.writer, "{}", "─".repeat(*width))?;
                }
                writeln!(self.writer)?;

                for row in rows {
                    for (i, cell) in row.iter().enumerate() {
                        if i > 0 {
                            write!(self.writer, " │ ")?;
                        }
                        if i < widths.len() {
                            write!(self.writer, "{:width$}", cell, width = widths[i])?;
                        } else {
                            write!(self.writer, "{}", cell)?;
                        }
                    }
                    writeln!(self.writer)?;
                }
            }
            OutputFormat::Csv => {
                writeln!(self.writer, "{}", headers.join(","))?;
                for row in rows {
                    let cells: Vec<String> = row.iter().map(|c| csv_cell(c)).collect();
                    writeln!(self.writer, "{}", cells.join(","))?;
                }
            }
            OutputFormat::Json => {
                // Конвертируем в JSON объекты
                let mut objects = Vec::new();
                for row in rows {
                    let mut obj = serde_json::Map::new();
                    for (i, header) in headers.iter().enumerate() {
                        if i < row.len() {
                            obj.insert(
                                header.to_string(),
                                serde_json::Value::String(row[i].clone()),
                            );
                        }
                    }
                    objects.push(serde_json::Value::Object(obj));
                }
                self.write_object(&objects)?;
            }
        }
        Ok(())
    }

    /// Завершает запись и сбрасывает буфер
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn csv_cell(cell: &str) -> String {
    if cell.contains(|c| c == ',' || c == '"' || c == '\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
