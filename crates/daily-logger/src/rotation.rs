//! Day tracking and the close/rename/reopen swap
//!
//! The open file and the day it belongs to are published together as an
//! immutable [`ActiveFile`] snapshot. Writers read the snapshot under the
//! shared side of `swap_lock`; rotation replaces it wholesale under the
//! exclusive side, so a write never straddles a rename.

use crate::clock::Clock;
use crate::{Error, Result};
use arc_swap::ArcSwap;
use chrono::{DateTime, Local, NaiveDate};
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Date suffix layout for rotated files
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug)]
struct ActiveFile {
    day: NaiveDate,
    file: Option<File>,
}

impl ActiveFile {
    fn open(day: NaiveDate, file: File) -> Arc<Self> {
        Arc::new(Self {
            day,
            file: Some(file),
        })
    }

    fn released(day: NaiveDate) -> Arc<Self> {
        Arc::new(Self { day, file: None })
    }
}

/// Owner of the active log file and the day it was opened for
pub struct RotationState {
    path: PathBuf,
    prefix: String,
    clock: Arc<dyn Clock>,
    active: ArcSwap<ActiveFile>,
    swap_lock: RwLock<()>,
    closed: AtomicBool,
}

impl std::fmt::Debug for RotationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotationState")
            .field("path", &self.path)
            .field("current_day", &self.current_day())
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl RotationState {
    /// Open (or create) `dir/file_name` for appending.
    ///
    /// A missing directory is created on a best-effort basis. If the file
    /// already exists and was last written on an earlier day it is rotated
    /// straight away, so the active file only ever holds today's lines.
    pub fn open(
        dir: impl AsRef<Path>,
        file_name: &str,
        prefix: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        ensure_dir(dir);

        let path = dir.join(file_name);
        let today = clock.today();
        let day = last_written_day(&path).map_or(today, |day| day.min(today));
        let file = open_append(&path)?;

        let state = Self {
            path,
            prefix: prefix.into(),
            clock,
            active: ArcSwap::new(ActiveFile::open(day, file)),
            swap_lock: RwLock::new(()),
            closed: AtomicBool::new(false),
        };

        if day != today {
            tracing::debug!(
                path = %state.path.display(),
                %day,
                "existing log file is from an earlier day"
            );
            if let Err(e) = state.ensure_fresh() {
                tracing::error!(error = %e, "failed to rotate stale log file at boot");
            }
        }

        Ok(state)
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Day the active file belongs to
    pub fn current_day(&self) -> NaiveDate {
        self.active.load().day
    }

    fn is_stale(&self) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        let active = self.active.load();
        active.file.is_none() || active.day != self.clock.today()
    }

    /// Rotate if the calendar day moved on (or no file is open).
    ///
    /// Safe to call from any number of threads: the first caller to take the
    /// exclusive lock rotates, later callers find a fresh snapshot and return
    /// `Ok(false)`.
    pub fn ensure_fresh(&self) -> Result<bool> {
        if !self.is_stale() {
            return Ok(false);
        }

        let _guard = self.swap_lock.write();
        if !self.is_stale() {
            return Ok(false);
        }
        self.swap().map(|()| true)
    }

    /// Rotate now, regardless of the date
    pub fn rotate(&self) -> Result<()> {
        let _guard = self.swap_lock.write();
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Closed);
        }
        self.swap()
    }

    // Caller holds the exclusive lock.
    fn swap(&self) -> Result<()> {
        let day = self.current_day();
        let today = self.clock.today();

        // Drop our handle before the rename.
        drop(self.active.swap(ActiveFile::released(day)));

        let archive = archive_path(&self.path, day);
        match fs::rename(&self.path, &archive) {
            Ok(()) => {
                tracing::debug!(
                    from = %self.path.display(),
                    to = %archive.display(),
                    "rotated log file"
                );
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no active log file to archive");
            }
            Err(source) => {
                // Keep appending to the old file and keep its day.
                match open_append(&self.path) {
                    Ok(file) => self.active.store(ActiveFile::open(day, file)),
                    Err(e) => tracing::error!(
                        error = %e,
                        "failed to reopen log file after rotation failure"
                    ),
                }
                return Err(Error::Rotation {
                    from: self.path.clone(),
                    to: archive,
                    source,
                });
            }
        }

        if let Some(dir) = self.path.parent() {
            ensure_dir(dir);
        }
        match open_append(&self.path) {
            Ok(file) => {
                self.active.store(ActiveFile::open(today, file));
                Ok(())
            }
            Err(e) => {
                self.active.store(ActiveFile::released(today));
                Err(e)
            }
        }
    }

    /// Append one line, adding the prefix and a trailing newline if missing.
    pub fn write(&self, line: &str) -> Result<()> {
        let _guard = self.swap_lock.read();
        let active = self.active.load();
        let Some(file) = active.file.as_ref() else {
            return Err(Error::NoActiveFile(self.path.clone()));
        };

        let mut buf = String::with_capacity(self.prefix.len() + line.len() + 1);
        buf.push_str(&self.prefix);
        buf.push_str(line);
        if !buf.ends_with('\n') {
            buf.push('\n');
        }

        // One write per line; the file is in append mode.
        let mut file: &File = file;
        file.write_all(buf.as_bytes()).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Release the file handle. Later writes fail and rotation stops.
    pub fn close(&self) {
        let _guard = self.swap_lock.write();
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let day = self.current_day();
        let released = self.active.swap(ActiveFile::released(day));
        if let Some(file) = released.file.as_ref() {
            if let Err(e) = file.sync_all() {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to sync log file on close"
                );
            }
        }
    }
}

fn ensure_dir(dir: &Path) {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return;
    }
    if let Err(source) = fs::create_dir_all(dir) {
        let e = Error::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        };
        tracing::warn!(error = %e, "continuing without log directory");
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

fn last_written_day(path: &Path) -> Option<NaiveDate> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Local>::from(modified).date_naive())
}

/// `path.YYYY-MM-DD`, with `.1`, `.2`, ... appended if that name is taken.
fn archive_path(path: &Path, day: NaiveDate) -> PathBuf {
    let mut base = path.as_os_str().to_owned();
    base.push(".");
    base.push(day.format(DATE_FORMAT).to_string());
    let base = PathBuf::from(base);

    if !base.exists() {
        return base;
    }
    (1u32..)
        .map(|n| {
            let mut candidate = base.as_os_str().to_owned();
            candidate.push(format!(".{n}"));
            PathBuf::from(candidate)
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::thread;
    use tracing_test::traced_test;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn open_state(dir: &Path, clock: &Arc<ManualClock>) -> RotationState {
        RotationState::open(dir, "app.log", "", clock.clone()).unwrap()
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("logs");
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));

        let state = open_state(&dir, &clock);

        assert!(dir.is_dir());
        assert!(state.path().exists());
        assert_eq!(state.current_day(), day(2024, 1, 10));
    }

    #[test]
    fn test_write_adds_prefix_and_newline() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));
        let state = RotationState::open(dir.path(), "app.log", "[svc] ", clock).unwrap();

        state.write("first").unwrap();
        state.write("second\n").unwrap();

        assert_eq!(read(state.path()), "[svc] first\n[svc] second\n");
    }

    #[test]
    fn test_rotation_moves_previous_day() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));
        let state = open_state(dir.path(), &clock);

        state.write("day one").unwrap();
        clock.advance_days(1);

        assert!(state.ensure_fresh().unwrap());
        state.write("day two").unwrap();

        assert_eq!(read(&dir.path().join("app.log.2024-01-10")), "day one\n");
        assert_eq!(read(state.path()), "day two\n");
        assert_eq!(state.current_day(), day(2024, 1, 11));
    }

    #[test]
    fn test_ensure_fresh_is_idempotent_within_a_day() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));
        let state = open_state(dir.path(), &clock);

        assert!(!state.ensure_fresh().unwrap());

        clock.advance_days(1);
        assert!(state.ensure_fresh().unwrap());
        assert!(!state.ensure_fresh().unwrap());

        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_concurrent_checks_rotate_once() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));
        let state = open_state(dir.path(), &clock);
        state.write("before midnight").unwrap();
        clock.advance_days(1);

        let rotations = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| state.ensure_fresh().unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|rotated| *rotated)
                .count()
        });

        assert_eq!(rotations, 1);
        assert_eq!(read(&dir.path().join("app.log.2024-01-10")), "before midnight\n");
        assert!(!dir.path().join("app.log.2024-01-10.1").exists());
    }

    #[test]
    fn test_forced_rotation_keeps_earlier_archives() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));
        let state = open_state(dir.path(), &clock);

        state.write("one").unwrap();
        state.rotate().unwrap();
        state.write("two").unwrap();
        state.rotate().unwrap();

        assert_eq!(read(&dir.path().join("app.log.2024-01-10")), "one\n");
        assert_eq!(read(&dir.path().join("app.log.2024-01-10.1")), "two\n");
        assert_eq!(read(state.path()), "");
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_failed_rename_keeps_old_file_and_day() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));
        // Fits NAME_MAX, but the dated archive name does not.
        let file_name = "a".repeat(250);
        let state = RotationState::open(dir.path(), &file_name, "", clock.clone()).unwrap();

        state.write("day one").unwrap();
        clock.advance_days(1);

        assert!(matches!(state.ensure_fresh(), Err(Error::Rotation { .. })));
        assert_eq!(state.current_day(), day(2024, 1, 10));

        state.write("still old file").unwrap();
        assert_eq!(read(state.path()), "day one\nstill old file\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_recovers_when_directory_disappears() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("logs");
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));
        let state = open_state(&dir, &clock);

        fs::remove_dir_all(&dir).unwrap();
        clock.advance_days(1);

        assert!(state.ensure_fresh().unwrap());
        state.write("after recovery").unwrap();

        assert_eq!(read(state.path()), "after recovery\n");
        assert_eq!(state.current_day(), day(2024, 1, 11));
    }

    #[test]
    fn test_existing_file_from_earlier_day_is_rotated_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old content\n").unwrap();

        // Pretend the host clock is already a week past the file's mtime.
        let written = last_written_day(&path).unwrap();
        let clock = Arc::new(ManualClock::at_date(written + chrono::Days::new(7)));
        let state = open_state(dir.path(), &clock);

        let archive = dir.path().join(format!("app.log.{}", written.format(DATE_FORMAT)));
        assert_eq!(read(&archive), "old content\n");
        assert_eq!(read(state.path()), "");
        assert_eq!(state.current_day(), clock.today());
    }

    #[test]
    fn test_close_stops_writes_and_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));
        let state = open_state(dir.path(), &clock);

        state.close();
        state.close();
        clock.advance_days(1);

        assert!(matches!(state.write("late"), Err(Error::NoActiveFile(_))));
        assert!(!state.ensure_fresh().unwrap());
        assert!(matches!(state.rotate(), Err(Error::Closed)));
        assert!(!dir.path().join("app.log.2024-01-10").exists());
    }

    #[test]
    #[traced_test]
    fn test_open_reports_uncreatable_directory() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let clock = Arc::new(ManualClock::at_date(day(2024, 1, 10)));

        let result = RotationState::open(blocker.join("logs"), "app.log", "", clock);

        assert!(matches!(result, Err(Error::OpenFile { .. })));
        assert!(logs_contain("continuing without log directory"));
    }

    #[test]
    fn test_archive_path_format() {
        let path = Path::new("/var/log/app.log");
        assert_eq!(
            archive_path(path, day(2023, 12, 31)),
            PathBuf::from("/var/log/app.log.2023-12-31")
        );
    }
}
