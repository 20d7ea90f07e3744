use std::{path::Path, sync::Arc};

use chrono::Local;
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncWriteExt, Stderr, stderr},
    sync::Mutex,
};

#[derive(Debug)]
enum Sink {
    File(File),
    Stderr(Stderr),
    Discard,
}

impl Sink {
    async fn write_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        match self {
            Sink::File(f) => {
                f.write_all(line).await?;
                f.flush().await
            }
            Sink::Stderr(s) => {
                s.write_all(line).await?;
                s.flush().await
            }
            Sink::Discard => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Logger {
    sink: Arc<Mutex<Sink>>,
    path: String,
    color_enable: bool,
}

const RESET: &str = "\x1b[0m";
const BG_BLUE: &str = "\x1b[44m"; // info
const BG_ORANGE: &str = "\x1b[48;5;208m"; // warning
const BG_RED: &str = "\x1b[41m";
const BG_GREEN: &str = "\x1b[42m"; // scan start
const BG_MAGENTA: &str = "\x1b[45m"; // scan end
const FG_BOLD_WHITE: &str = "\x1b[97;1m";

fn color_from_env() -> bool {
    std::env::var("GIT_REMINDER_NO_COLOR").ok().as_deref() != Some("1")
}

impl Logger {
    /// Appends to `path`, creating it (and its parent directory) if needed.
    pub async fn new(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .await?;
        Ok(Self {
            sink: Arc::new(Mutex::new(Sink::File(file))),
            path: path.to_string_lossy().into_owned(),
            color_enable: false,
        })
    }

    pub fn stderr() -> Logger {
        Logger {
            sink: Arc::new(Mutex::new(Sink::Stderr(stderr()))),
            path: String::new(),
            color_enable: color_from_env(),
        }
    }

    pub fn placeholder() -> Logger {
        Logger {
            sink: Arc::new(Mutex::new(Sink::Discard)),
            path: String::new(),
            color_enable: false,
        }
    }

    fn paint_level(&self, level: &str) -> String {
        if !self.color_enable {
            return level.to_string();
        }
        match level {
            "INFO" => format!("{BG_BLUE}{FG_BOLD_WHITE} {level} {RESET}"),
            "WARNING" => format!("{BG_ORANGE}{FG_BOLD_WHITE} {level} {RESET}"),
            "ERROR" => format!("{BG_RED}{FG_BOLD_WHITE} {level} {RESET}"),
            "SCAN START" => format!("{BG_GREEN}{FG_BOLD_WHITE} {level} {RESET}"),
            "SCAN END" => format!("{BG_MAGENTA}{FG_BOLD_WHITE} {level} {RESET}"),
            _ => level.to_string(),
        }
    }

    pub async fn log(&self, level: &str, msg: &str) -> anyhow::Result<()> {
        let mut sink = self.sink.lock().await;
        let now = Local::now();
        let line = format!(
            "[{}] {}: {}\n",
            now.format("%Y-%m-%d %H:%M:%S"),
            self.paint_level(level),
            msg
        );
        sink.write_line(line.as_bytes()).await?;
        Ok(())
    }

    pub async fn info(&self, msg: &str) -> anyhow::Result<()> {
        self.log("INFO", msg).await
    }

    pub async fn warning(&self, msg: &str) -> anyhow::Result<()> {
        self.log("WARNING", msg).await
    }

    pub async fn error(&self, msg: &str) -> anyhow::Result<()> {
        self.log("ERROR", msg).await
    }

    pub async fn scan_start(&self, msg: &str) -> anyhow::Result<()> {
        self.log("SCAN START", msg).await
    }

    pub async fn scan_end(&self, msg: &str) -> anyhow::Result<()> {
        self.log("SCAN END", msg).await
    }

    pub fn get_path(&self) -> Result<String, anyhow::Error> {
        if self.path.is_empty() {
            Err(anyhow::anyhow!("Logger is not backed by a file"))
        } else {
            Ok(self.path.clone())
        }
    }
}
