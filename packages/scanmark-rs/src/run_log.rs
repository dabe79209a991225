//! The per-run log: one timestamped line per event, appended to a file and
//! echoed to the console.
use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
  Info,
  Warn,
  Error,
}

impl fmt::Display for LogLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      LogLevel::Info => "INFO",
      LogLevel::Warn => "WARN",
      LogLevel::Error => "ERROR",
    })
  }
}

/// How much of the log is mirrored to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleEcho {
  /// Every line.
  #[default]
  Verbose,
  /// Warnings and errors only.
  Quiet,
  /// Nothing; the file still receives every line.
  Silent,
}

/// Log file name for a run started at `started`.
pub fn log_file_name(started: DateTime<Local>) -> String {
  format!("ocr_run_{}.log", started.format("%Y%m%d_%H%M%S"))
}

pub struct RunLog {
  file: Option<(PathBuf, File)>,
  echo: ConsoleEcho,
}

impl RunLog {
  /// Opens `path` for appending, creating it and its parent directories.
  pub fn open(path: &Path, echo: ConsoleEcho) -> io::Result<Self> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Self {
      file: Some((path.to_path_buf(), file)),
      echo,
    })
  }

  /// Starts a fresh timestamped log inside `log_dir`. When the file cannot be
  /// created the run goes on with console output only.
  pub fn start(log_dir: &Path, echo: ConsoleEcho) -> Self {
    let path = log_dir.join(log_file_name(Local::now()));
    match Self::open(&path, echo) {
      Ok(log) => log,
      Err(e) => {
        eprintln!("Warning: cannot write log file {}: {}", path.display(), e);
        Self::console(echo)
      }
    }
  }

  pub fn console(echo: ConsoleEcho) -> Self {
    Self { file: None, echo }
  }

  pub fn path(&self) -> Option<&Path> {
    self.file.as_ref().map(|(path, _)| path.as_path())
  }

  pub fn info(&self, message: impl AsRef<str>) {
    self.record(LogLevel::Info, message.as_ref());
  }

  pub fn warn(&self, message: impl AsRef<str>) {
    self.record(LogLevel::Warn, message.as_ref());
  }

  pub fn error(&self, message: impl AsRef<str>) {
    self.record(LogLevel::Error, message.as_ref());
  }

  fn record(&self, level: LogLevel, message: &str) {
    let line = format!("[{}] {} {}", Local::now().format("%Y-%m-%d %H:%M:%S"), level, message);

    match (self.echo, level) {
      (ConsoleEcho::Silent, _) | (ConsoleEcho::Quiet, LogLevel::Info) => {}
      (_, LogLevel::Info) => println!("{}", line),
      _ => eprintln!("{}", line),
    }

    if let Some((path, file)) = &self.file {
      let mut file: &File = file;
      if let Err(e) = writeln!(file, "{}", line) {
        eprintln!("Warning: cannot write log file {}: {}", path.display(), e);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_log_file_name() {
    let started = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(log_file_name(started), "ocr_run_20240102_030405.log");
  }

  #[test]
  fn test_lines_are_appended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs/run.log");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "earlier line\n").unwrap();

    let log = RunLog::open(&path, ConsoleEcho::Silent).unwrap();
    log.info("starting");
    log.warn("odd result");
    log.error("gave up");

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "earlier line");
    assert!(lines[1].starts_with('[') && lines[1].ends_with("] INFO starting"));
    assert!(lines[2].ends_with("] WARN odd result"));
    assert!(lines[3].ends_with("] ERROR gave up"));
  }

  #[test]
  fn test_start_creates_timestamped_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = RunLog::start(&dir.path().join("logs"), ConsoleEcho::Silent);
    log.info("hello");

    let path = log.path().unwrap();
    let name = path.file_name().unwrap().to_string_lossy();
    assert!(name.starts_with("ocr_run_") && name.ends_with(".log"));
    assert!(std::fs::read_to_string(path).unwrap().contains("INFO hello"));
  }

  #[test]
  fn test_console_only_log_has_no_path() {
    let log = RunLog::console(ConsoleEcho::Silent);
    log.info("nowhere");
    assert!(log.path().is_none());
  }
}
