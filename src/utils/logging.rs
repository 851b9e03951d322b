use std::fs::OpenOptions;
use std::io::{BufWriter, Write};

/// Append-only transcript logging. Disabled unless a log file is configured;
/// write failures are surfaced to the caller so they can be reported without
/// interrupting a submission.
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Self {
        let is_active = log_file.is_some();
        LoggingState {
            file_path: log_file,
            is_active,
        }
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, Box<dyn std::error::Error>> {
        // Test if we can create/write to the file
        self.test_file_access(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn is_active(&self) -> bool {
        self.is_active && self.file_path.is_some()
    }

    pub fn log_message(&self, speaker: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = self.file_path.as_ref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{speaker}:")?;
        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between turns, matching on-screen spacing.
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_disabled_without_file() {
        let logging = LoggingState::new(None);
        assert!(!logging.is_active());
        logging
            .log_message("user", "ignored")
            .expect("disabled logging should be a no-op");
    }

    #[test]
    fn messages_append_with_speaker_and_spacing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chat.log");
        let logging = LoggingState::new(Some(path.display().to_string()));

        logging.log_message("user", "first\nsecond").expect("log write");
        logging.log_message("assistant", "reply").expect("log write");

        let contents = std::fs::read_to_string(&path).expect("read log");
        assert_eq!(contents, "user:\nfirst\nsecond\n\nassistant:\nreply\n\n");
    }

    #[test]
    fn set_log_file_activates_logging() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("chat.log");
        let mut logging = LoggingState::new(None);

        let status = logging
            .set_log_file(path.display().to_string())
            .expect("file should be writable");
        assert!(status.starts_with("Logging enabled to:"));
        assert!(logging.is_active());
    }
}
