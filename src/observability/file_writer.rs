//! Size-rotated, append-only line writer for trace files.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// When to rotate and how many rotated files to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    pub max_bytes: u64,
    pub max_backups: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            max_backups: 3,
        }
    }
}

/// Appends lines to a file, rotating it to `<name>.json.<unix-secs>` once it
/// grows past the policy's size. Safe to share between threads.
pub struct FileWriter {
    file_path: PathBuf,
    policy: RotationPolicy,
    /// Opened lazily on the first write.
    writer: Mutex<Option<fs::File>>,
}

impl FileWriter {
    pub fn new(file_path: PathBuf) -> Self {
        Self::with_policy(file_path, RotationPolicy::default())
    }

    pub const fn with_policy(file_path: PathBuf, policy: RotationPolicy) -> Self {
        Self {
            file_path,
            policy,
            writer: Mutex::new(None),
        }
    }

    /// Writes `line` plus a newline and flushes.
    ///
    /// # Errors
    ///
    /// Fails if the lock is poisoned or rotating, opening, writing or flushing
    /// the file fails.
    pub fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| std::io::Error::other(format!("Mutex poisoned: {e}")))?;

        if fs::metadata(&self.file_path).is_ok_and(|m| m.len() > self.policy.max_bytes) {
            *writer = None;
            self.rotate()?;
        }

        if writer.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file_path)?;
            *writer = Some(file);
        }

        let file = writer
            .as_mut()
            .ok_or_else(|| std::io::Error::other("No file available"))?;
        writeln!(file, "{line}")?;
        file.flush()
    }

    fn rotate(&self) -> std::io::Result<()> {
        let timestamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let backup_path = self.file_path.with_extension(format!("json.{timestamp}"));
        if self.file_path.exists() {
            fs::rename(&self.file_path, &backup_path)?;
        }
        self.prune_backups()
    }

    /// Deletes the oldest backups beyond the retention limit. Individual delete
    /// failures are ignored.
    fn prune_backups(&self) -> std::io::Result<()> {
        let parent = self
            .file_path
            .parent()
            .ok_or_else(|| std::io::Error::other("No parent directory"))?;
        let stem = self
            .file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| std::io::Error::other("Invalid file name"))?;

        let mut backups: Vec<PathBuf> = fs::read_dir(parent)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| is_backup_of(path, stem))
            .collect();

        // Backup names end in a timestamp, so newest sorts last.
        backups.sort_by_key(|path| backup_timestamp(path));
        let excess = backups.len().saturating_sub(self.policy.max_backups);
        for old in backups.iter().take(excess) {
            let _ = fs::remove_file(old);
        }
        Ok(())
    }
}

fn is_backup_of(path: &Path, stem: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_prefix(stem))
        .is_some_and(|rest| rest.starts_with(".json."))
}

fn backup_timestamp(path: &Path) -> i64 {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ext.parse().ok())
        .unwrap_or_default()
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("file_path", &self.file_path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let writer = FileWriter::new(path.clone());
        writer.write_line("{\"a\":1}").unwrap();
        writer.write_line("{\"b\":2}").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "{\"a\":1}\n{\"b\":2}\n");
    }

    #[test]
    fn oversized_file_is_rotated_and_backups_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        let writer = FileWriter::with_policy(
            path.clone(),
            RotationPolicy {
                max_bytes: 4,
                max_backups: 2,
            },
        );

        for i in 0..5 {
            writer.write_line(&format!("line-{i}")).unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "line-4\n");
        let backups = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| is_backup_of(&e.path(), "trace"))
            .count();
        assert_eq!(backups, 2);
    }

    #[test]
    fn backup_names_are_recognized() {
        assert!(is_backup_of(Path::new("/d/trace.json.17"), "trace"));
        assert!(!is_backup_of(Path::new("/d/trace.json"), "trace"));
        assert!(!is_backup_of(Path::new("/d/other.json.17"), "trace"));
        assert_eq!(backup_timestamp(Path::new("/d/trace.json.17")), 17);
    }
}
