//! In-memory, instrumented filesystem for walker tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dirpull::{Dirent, EntryKind, FileSystem, Stats};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ReadDir(PathBuf),
    Stat(PathBuf),
    Lstat(PathBuf),
    Realpath(PathBuf),
}

#[derive(Debug, Clone)]
enum Node {
    Dir(Vec<String>),
    File,
    Symlink(PathBuf),
}

#[derive(Default)]
struct Inner {
    nodes: HashMap<PathBuf, Node>,
    read_dir_failures: HashMap<PathBuf, io::ErrorKind>,
    hide_types: bool,
    calls: Vec<Call>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Cheap to clone; clones share the same tree and call log.
#[derive(Clone)]
pub struct MemoryFs {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        let mut inner = Inner::default();
        inner.nodes.insert(PathBuf::from("/"), Node::Dir(Vec::new()));
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub fn dir(self, path: &str) -> Self {
        self.add(path, Node::Dir(Vec::new()))
    }

    pub fn file(self, path: &str) -> Self {
        self.add(path, Node::File)
    }

    pub fn symlink(self, path: &str, target: &str) -> Self {
        self.add(path, Node::Symlink(PathBuf::from(target)))
    }

    /// Make listing `path` fail with `kind`.
    pub fn fail_read_dir(self, path: &str, kind: io::ErrorKind) -> Self {
        self.inner
            .lock()
            .unwrap()
            .read_dir_failures
            .insert(PathBuf::from(path), kind);
        self
    }

    /// Return listings without type hints, forcing the walker to lstat.
    pub fn hide_types(self) -> Self {
        self.inner.lock().unwrap().hide_types = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Directories listed so far, in call order.
    pub fn read_dirs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::ReadDir(p) => Some(p.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.lock().unwrap().max_in_flight
    }

    fn add(self, path: &str, node: Node) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let path = PathBuf::from(path);
            let parent = path.parent().unwrap().to_path_buf();
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            match inner.nodes.get_mut(&parent) {
                Some(Node::Dir(children)) => children.push(name),
                _ => panic!("parent of {} must be added first", path.display()),
            }
            inner.nodes.insert(path, node);
        }
        self
    }

    fn begin(&self, call: Call) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        inner.in_flight += 1;
        inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
    }

    fn end(&self) {
        self.inner.lock().unwrap().in_flight -= 1;
    }

    fn resolve(inner: &Inner, path: &Path, hops: &mut usize) -> io::Result<PathBuf> {
        let mut out = PathBuf::from("/");
        for comp in path.components() {
            match comp {
                Component::RootDir | Component::Prefix(_) => out = PathBuf::from("/"),
                Component::CurDir => {}
                Component::ParentDir => {
                    out.pop();
                }
                Component::Normal(name) => {
                    out.push(name);
                    match inner.nodes.get(&out) {
                        None => return Err(io::Error::from(io::ErrorKind::NotFound)),
                        Some(Node::Symlink(target)) => {
                            *hops += 1;
                            if *hops > 40 {
                                return Err(io::Error::other("too many levels of symbolic links"));
                            }
                            let joined = out.parent().unwrap().join(target);
                            out = Self::resolve(inner, &joined, hops)?;
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        Ok(out)
    }

    fn kind_of(node: &Node) -> EntryKind {
        match node {
            Node::Dir(_) => EntryKind::Dir,
            Node::File => EntryKind::File,
            Node::Symlink(_) => EntryKind::Symlink,
        }
    }

    fn lstat_now(&self, path: &Path) -> io::Result<Stats> {
        let inner = self.inner.lock().unwrap();
        let key = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => Self::resolve(&inner, parent, &mut 0)?.join(name),
            _ => PathBuf::from("/"),
        };
        inner
            .nodes
            .get(&key)
            .map(|n| Stats::new(Self::kind_of(n)))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn realpath_now(&self, path: &Path) -> io::Result<PathBuf> {
        let inner = self.inner.lock().unwrap();
        Self::resolve(&inner, path, &mut 0)
    }

    fn read_dir_now(&self, path: &Path) -> io::Result<Vec<Dirent>> {
        let inner = self.inner.lock().unwrap();
        if let Some(kind) = inner.read_dir_failures.get(path) {
            return Err(io::Error::from(*kind));
        }
        let real = Self::resolve(&inner, path, &mut 0)?;
        match inner.nodes.get(&real) {
            Some(Node::Dir(children)) => Ok(children
                .iter()
                .map(|name| {
                    let kind = (!inner.hide_types)
                        .then(|| Self::kind_of(&inner.nodes[&real.join(name)]));
                    Dirent::new(name.clone(), kind)
                })
                .collect()),
            Some(_) => Err(io::Error::other("not a directory")),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<Dirent>> {
        self.begin(Call::ReadDir(path.to_path_buf()));
        tokio::task::yield_now().await;
        let result = self.read_dir_now(path);
        self.end();
        result
    }

    async fn stat(&self, path: &Path) -> io::Result<Stats> {
        self.begin(Call::Stat(path.to_path_buf()));
        tokio::task::yield_now().await;
        let result = self.realpath_now(path).and_then(|real| self.lstat_now(&real));
        self.end();
        result
    }

    async fn lstat(&self, path: &Path) -> io::Result<Stats> {
        self.begin(Call::Lstat(path.to_path_buf()));
        tokio::task::yield_now().await;
        let result = self.lstat_now(path);
        self.end();
        result
    }

    async fn realpath(&self, path: &Path) -> io::Result<PathBuf> {
        self.begin(Call::Realpath(path.to_path_buf()));
        tokio::task::yield_now().await;
        let result = self.realpath_now(path);
        self.end();
        result
    }
}

/// Relative paths of entries, rendered with `/`.
pub fn paths(entries: &[dirpull::Entry]) -> Vec<String> {
    entries.iter().map(|e| e.path_with_separator("/")).collect()
}
