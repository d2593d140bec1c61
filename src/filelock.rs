use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use file_lock::{FileLock, FileOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn read_file(path: &Path) -> Result<Option<Vec<u8>>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err).with_context(|| format!("open file '{}'", path.display())),
    };

    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .with_context(|| format!("read file '{}'", path.display()))?;
    Ok(Some(data))
}

/// Replaces the file content atomically: the data goes to a temporary file
/// that is then renamed over `path`, so readers see either the old or the new
/// content, never a partial one. Writers from different processes are
/// serialized by a lock on `<path>.lock`.
pub fn write_file_lock(path: &Path, data: &[u8]) -> Result<()> {
    let lock_path = sibling_path(path, ".lock");
    let lock_opts = FileOptions::new().write(true).create(true);
    let _lock = FileLock::lock(&lock_path, true, lock_opts)
        .with_context(|| format!("lock file '{}'", lock_path.display()))?;

    let temp_path = sibling_path(
        path,
        &format!(
            ".{}.{}.tmp",
            process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ),
    );
    if let Err(err) = write_temp(&temp_path, data) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err).with_context(|| format!("replace file '{}'", path.display()));
    }
    Ok(())
}

fn write_temp(path: &Path, data: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("create file '{}'", path.display()))?;
    file.write_all(data)
        .with_context(|| format!("write file '{}'", path.display()))?;
    file.sync_all()
        .with_context(|| format!("sync file '{}'", path.display()))?;
    Ok(())
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    const FIRST_CONTENT: &[u8] = br#"{"token":"first"}"#;
    const SECOND_CONTENT: &[u8] = br#"{"token":"second-and-longer"}"#;
    const ITERATIONS: usize = 200;
    const CONCURRENT_TASKS: usize = 8;

    #[tokio::test]
    async fn test_concurrent_file_operations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        write_file_lock(&path, FIRST_CONTENT).unwrap();

        let tasks: Vec<_> = (0..CONCURRENT_TASKS)
            .map(|i| {
                let path = path.clone();
                tokio::task::spawn_blocking(move || {
                    for j in 0..ITERATIONS {
                        if (i + j) % 2 == 0 {
                            let content = if j % 4 == 0 {
                                FIRST_CONTENT
                            } else {
                                SECOND_CONTENT
                            };
                            write_file_lock(&path, content)?;
                        } else {
                            let content = read_file(&path)?.expect("file should exist");
                            assert!(
                                content == FIRST_CONTENT || content == SECOND_CONTENT,
                                "read partial content: {:?}",
                                String::from_utf8_lossy(&content)
                            );
                        }
                    }
                    Ok::<_, anyhow::Error>(())
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        write_file_lock(&path, SECOND_CONTENT).unwrap();
        let final_content = read_file(&path).unwrap().unwrap();
        assert_eq!(final_content, SECOND_CONTENT);

        // Only the data file and the lock file are left behind.
        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["store.json", "store.json.lock"]);
    }

    #[test]
    fn test_reader_never_sees_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        write_file_lock(&path, FIRST_CONTENT).unwrap();

        let writer_path = path.clone();
        let writer = thread::spawn(move || {
            for _ in 0..ITERATIONS {
                write_file_lock(&writer_path, FIRST_CONTENT).unwrap();
            }
        });

        for _ in 0..ITERATIONS {
            let content = read_file(&path).unwrap().unwrap();
            assert_eq!(content, FIRST_CONTENT);
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_read_nonexistent_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_file(&dir.path().join("missing.json")).unwrap();
        assert!(result.is_none());
    }
}
