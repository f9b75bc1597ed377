//! Append-only interaction transcript
//!
//! The file is opened, written and closed for every record.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::LogRecord;

#[derive(Debug, Clone)]
pub struct Transcript {
    path: PathBuf,
}

impl Transcript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &LogRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        file.write_all(record.render().as_bytes())
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_append_accumulates_records() {
        let path = std::env::temp_dir().join("agent_router_transcript_test.txt");
        fs::remove_file(&path).ok();

        let transcript = Transcript::new(&path);
        transcript.append(&LogRecord::now("add 1 and 2", "1 + 2 = 3")).unwrap();
        transcript.append(&LogRecord::now("hi", "Hello!")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("-".repeat(50).as_str()).count(), 2);
        assert!(content.contains("You: add 1 and 2\nAssistant: 1 + 2 = 3\n"));
        assert!(content.contains("You: hi\nAssistant: Hello!\n"));
        assert!(content.starts_with('['));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_append_to_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("agent_router_no_such_dir")
            .join("transcript.txt");
        let transcript = Transcript::new(&path);
        let err = transcript.append(&LogRecord::now("a", "b")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
