pub mod log;

use crate::Result;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        Ok(false)
    } else {
        fs::create_dir_all(dir)?;
        Ok(true)
    }
}

/// Writes one host per line, each line `\n` terminated.
pub fn write_lines(path: &Path, hosts: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let mut file = BufWriter::new(File::create(path)?);
    for host in hosts {
        writeln!(file, "{}", host)?;
    }
    file.flush()?;
    Ok(())
}

// region:        --- Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_lines_creates_parents_and_terminates_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/hosts.txt");
        let hosts = vec!["a.example.com".to_string(), "b.example.com".to_string()];

        write_lines(&path, &hosts).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "a.example.com\nb.example.com\n");
    }

    #[test]
    fn ensure_dir_reports_creation() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs");
        assert!(ensure_dir(&target).unwrap());
        assert!(!ensure_dir(&target).unwrap());
    }
}

// endregion:     --- Tests
