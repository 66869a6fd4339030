use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::classify::{classify, EntryClass, Lineage};
use crate::entry::{Dirent, Entry};
use crate::error::WalkError;
use crate::policy::ErrorClass;
use crate::settings::Settings;
use crate::traits::FileSystem;

// ---------------------------------------------------------------------------
// Scheduler state
// ---------------------------------------------------------------------------

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// Root not validated yet; no I/O has happened.
    Start,
    /// Between directories.
    Idle,
    /// A directory listing is outstanding.
    ReadingDir,
    /// Working through a directory's buffered listing.
    Draining,
    /// Every reachable directory has been drained.
    Done,
    /// A fatal error was surfaced; nothing more will be emitted.
    Errored,
}

/// A directory waiting to be (or being) read.
#[derive(Debug)]
pub struct PendingDir {
    /// `root.join(relative_path)`.
    pub full_path: PathBuf,
    pub relative_path: PathBuf,
    /// Root = 0.
    pub depth: usize,
    /// Canonical paths from the root down to this directory.
    pub lineage: Arc<Lineage>,
}

#[derive(Debug)]
struct Drain {
    dir: Arc<PendingDir>,
    raw: VecDeque<Dirent>,
    /// Subdirectories found so far, in listing order.
    discovered: Vec<PendingDir>,
}

#[derive(Debug)]
enum State {
    Start,
    Idle,
    ReadingDir(PendingDir),
    Draining(Drain),
    Done,
    Errored,
}

/// Outcome of processing one raw listing item.
#[derive(Default)]
struct Step {
    emit: Option<Entry>,
    descend: Option<PendingDir>,
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

/// The traversal scheduler.
///
/// Holds a stack of pending directories and the buffered listing of the one
/// being drained. It does no work on its own: every filesystem call happens
/// inside [`next_entry`](Walker::next_entry), and a call returns as soon as one
/// entry is ready. A consumer that stops pulling stops all I/O.
///
/// Directories are walked depth-first: a directory's own entries are emitted
/// first, then its subdirectories are walked in listing order.
pub struct Walker<F> {
    fs: F,
    settings: Arc<Settings>,
    state: State,
    stack: Vec<PendingDir>,
    warnings: Vec<WalkError>,
    /// Fatal error held back by `read` behind a partial batch.
    pub(crate) deferred: Option<WalkError>,
    files_seen: usize,
    dirs_seen: usize,
}

impl<F: FileSystem> Walker<F> {
    pub(crate) fn new(fs: F, settings: Arc<Settings>) -> Self {
        Self {
            fs,
            settings,
            state: State::Start,
            stack: Vec::new(),
            warnings: Vec::new(),
            deferred: None,
            files_seen: 0,
            dirs_seen: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> WalkState {
        match self.state {
            State::Start => WalkState::Start,
            State::Idle => WalkState::Idle,
            State::ReadingDir(_) => WalkState::ReadingDir,
            State::Draining(_) => WalkState::Draining,
            State::Done => WalkState::Done,
            State::Errored => WalkState::Errored,
        }
    }

    /// Directories queued but not read yet, excluding the one being drained.
    pub fn pending_dirs(&self) -> usize {
        self.stack.len()
    }

    /// Warnings kept so far. Only populated with `collect_warnings(true)`.
    pub fn take_warnings(&mut self) -> Vec<WalkError> {
        std::mem::take(&mut self.warnings)
    }

    /// Files and directories classified so far, emitted or not.
    pub fn seen(&self) -> (usize, usize) {
        (self.files_seen, self.dirs_seen)
    }

    /// Pull the next entry.
    ///
    /// Returns `None` once the walk is done. A fatal error is returned exactly
    /// once, after which the walker yields `None`.
    ///
    /// Cancel-safe: dropping the future mid-way loses nothing; the
    /// interrupted filesystem call is issued again on the next pull.
    pub async fn next_entry(&mut self) -> Option<Result<Entry, WalkError>> {
        if let Some(err) = self.deferred.take() {
            return Some(Err(err));
        }
        loop {
            match self.state {
                State::Start => {
                    if let Err(e) = self.open_root().await {
                        self.state = State::Errored;
                        return Some(Err(e));
                    }
                }
                State::Idle => {
                    self.state = match self.stack.pop() {
                        Some(dir) => State::ReadingDir(dir),
                        None => {
                            debug!(files = self.files_seen, dirs = self.dirs_seen, "walk done");
                            State::Done
                        }
                    };
                }
                State::ReadingDir(ref dir) => {
                    let path = dir.full_path.clone();
                    debug!(path = %path.display(), depth = dir.depth, "reading directory");
                    let listing = self.fs.read_dir(&path).await;

                    let State::ReadingDir(dir) = std::mem::replace(&mut self.state, State::Idle)
                    else {
                        unreachable!("state changed while reading a directory")
                    };
                    match listing {
                        Ok(raw) => {
                            self.state = State::Draining(Drain {
                                dir: Arc::new(dir),
                                raw: raw.into(),
                                discovered: Vec::new(),
                            });
                        }
                        Err(e) => {
                            if let Err(fatal) = self.route(WalkError::from_io(path, e)) {
                                return Some(Err(fatal));
                            }
                        }
                    }
                }
                State::Draining(ref mut drain) => {
                    let Some(raw) = drain.raw.front().cloned() else {
                        let State::Draining(drain) =
                            std::mem::replace(&mut self.state, State::Idle)
                        else {
                            unreachable!("state changed while draining")
                        };
                        // Reversed so the first subdirectory listed is read first.
                        self.stack.extend(drain.discovered.into_iter().rev());
                        continue;
                    };
                    let dir = Arc::clone(&drain.dir);

                    let step = match self.process(&dir, raw).await {
                        Ok(step) => step,
                        Err(fatal) => {
                            self.state = State::Errored;
                            return Some(Err(fatal));
                        }
                    };

                    if let State::Draining(ref mut drain) = self.state {
                        drain.raw.pop_front();
                        drain.discovered.extend(step.descend);
                    }
                    if let Some(entry) = step.emit {
                        return Some(Ok(entry));
                    }
                }
                State::Done | State::Errored => return None,
            }
        }
    }

    /// Validate the root and queue it as the only pending directory.
    ///
    /// Root failures are always fatal, whatever the error policy says.
    async fn open_root(&mut self) -> Result<(), WalkError> {
        let root = self.settings.root.clone();
        let real = self
            .fs
            .realpath(&root)
            .await
            .map_err(|e| WalkError::from_io(&root, e))?;
        let stats = self
            .fs
            .stat(&real)
            .await
            .map_err(|e| WalkError::from_io(&root, e))?;
        if !stats.is_dir() {
            return Err(WalkError::NotADirectory(root));
        }

        debug!(root = %root.display(), real = %real.display(), "walk started");
        self.state = State::Idle;
        if self.settings.may_descend(0) {
            self.stack.push(PendingDir {
                full_path: root,
                relative_path: PathBuf::new(),
                depth: 0,
                lineage: Lineage::root(real),
            });
        }
        Ok(())
    }

    /// Build, classify and filter one listing item.
    ///
    /// Expected errors are routed to the warning channel and turn into an
    /// empty step; fatal ones are returned.
    async fn process(&mut self, dir: &PendingDir, raw: Dirent) -> Result<Step, WalkError> {
        let settings = Arc::clone(&self.settings);
        let mut entry = Entry::new(&settings.root, &dir.relative_path, raw, dir.depth + 1);

        let classified = match classify(&self.fs, &settings, &dir.lineage, &mut entry).await {
            Ok(Some(c)) => c,
            Ok(None) => return Ok(Step::default()),
            Err(e) => {
                self.route(e)?;
                return Ok(Step::default());
            }
        };

        let mut step = Step::default();
        match classified.class {
            EntryClass::Directory => {
                self.dirs_seen += 1;
                let passes = match &settings.directory_filter {
                    Some(f) => f.matches(&entry)?,
                    None => true,
                };
                if !passes {
                    return Ok(step);
                }
                if settings.may_descend(entry.depth) {
                    let real = classified
                        .real_path
                        .unwrap_or_else(|| dir.lineage.real_path().join(&entry.dirent.file_name));
                    step.descend = Some(PendingDir {
                        full_path: entry.full_path.clone(),
                        relative_path: entry.path.clone(),
                        depth: entry.depth,
                        lineage: dir.lineage.child(real),
                    });
                }
                if settings.entry_type.wants_dirs() {
                    step.emit = Some(entry);
                }
            }
            class => {
                let wanted = match class {
                    EntryClass::File => {
                        self.files_seen += 1;
                        settings.entry_type.wants_files()
                    }
                    _ => settings.entry_type.wants_everything(),
                };
                if !wanted {
                    return Ok(step);
                }
                let passes = match &settings.file_filter {
                    Some(f) => f.matches(&entry)?,
                    None => true,
                };
                if passes {
                    step.emit = Some(entry);
                }
            }
        }
        Ok(step)
    }

    /// Send an error through the error policy.
    ///
    /// Expected errors become warnings and `Ok(())`; fatal errors move the
    /// walker to `Errored` and come back as `Err`.
    fn route(&mut self, err: WalkError) -> Result<(), WalkError> {
        let class = match err {
            WalkError::BrokenSymlink(_) if self.settings.throw_on_broken_symlink => {
                ErrorClass::Fatal
            }
            ref e => self.settings.error_policy.classify(e),
        };
        match class {
            ErrorClass::Expected => {
                warn!(error = %err, "skipping");
                if let Some(sink) = &self.settings.on_warning {
                    sink(&err);
                }
                if self.settings.collect_warnings {
                    self.warnings.push(err);
                }
                Ok(())
            }
            ErrorClass::Fatal => {
                self.state = State::Errored;
                Err(err)
            }
        }
    }
}
