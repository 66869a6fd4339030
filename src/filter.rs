//! Filter compilation.
//!
//! Callers describe filters in whichever shape is convenient ([`FilterSpec`]);
//! [`compile_filter`] turns every shape into one [`CompiledFilter`] before the
//! walk starts, so the scheduler never branches on filter shape per entry.

use std::fmt;
use std::sync::Arc;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::entry::Entry;
use crate::error::{BoxError, WalkError};

/// Canonical predicate over an [`Entry`].
pub type Predicate = Arc<dyn Fn(&Entry) -> Result<bool, BoxError> + Send + Sync>;

/// A user-supplied filter, before compilation.
#[derive(Clone)]
pub enum FilterSpec {
    /// Arbitrary predicate. Errors it returns halt the walk.
    Predicate(Predicate),

    /// A single glob matched against the entry name. A leading `!` negates it.
    Glob(String),

    /// Globs matched against the entry name. Patterns starting with `!` exclude.
    Globs(Vec<String>),
}

impl FilterSpec {
    /// Wrap an infallible predicate.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Entry) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(move |e: &Entry| -> Result<bool, BoxError> { Ok(f(e)) }))
    }

    /// Wrap a fallible predicate.
    pub fn try_predicate<F, E>(f: F) -> Self
    where
        F: Fn(&Entry) -> Result<bool, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::Predicate(Arc::new(move |e: &Entry| -> Result<bool, BoxError> {
            f(e).map_err(Into::into)
        }))
    }
}

impl fmt::Debug for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Glob(g) => f.debug_tuple("Glob").field(g).finish(),
            Self::Globs(g) => f.debug_tuple("Globs").field(g).finish(),
        }
    }
}

impl From<&str> for FilterSpec {
    fn from(s: &str) -> Self {
        Self::Glob(s.to_string())
    }
}

impl From<String> for FilterSpec {
    fn from(s: String) -> Self {
        Self::Glob(s)
    }
}

impl From<Vec<String>> for FilterSpec {
    fn from(v: Vec<String>) -> Self {
        Self::Globs(v)
    }
}

impl From<Vec<&str>> for FilterSpec {
    fn from(v: Vec<&str>) -> Self {
        Self::Globs(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for FilterSpec {
    fn from(v: &[&str]) -> Self {
        Self::Globs(v.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterSpec {
    fn from(v: [&str; N]) -> Self {
        Self::Globs(v.iter().map(|s| s.to_string()).collect())
    }
}

/// A filter ready for use by the scheduler.
#[derive(Clone)]
pub struct CompiledFilter(Predicate);

impl CompiledFilter {
    /// Run the filter. Predicate failures come back as [`WalkError::Filter`].
    pub fn matches(&self, entry: &Entry) -> Result<bool, WalkError> {
        (self.0)(entry).map_err(|source| WalkError::Filter {
            path: entry.full_path.clone(),
            source,
        })
    }
}

impl fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompiledFilter(..)")
    }
}

/// Compile a filter spec. `None` means "no filtering".
///
/// # Errors
///
/// Returns [`WalkError::InvalidPattern`] for the first glob that fails to parse.
pub fn compile_filter(spec: Option<FilterSpec>) -> Result<Option<CompiledFilter>, WalkError> {
    let predicate: Predicate = match spec {
        None => return Ok(None),
        Some(FilterSpec::Predicate(p)) => p,
        Some(FilterSpec::Glob(pattern)) => compile_globs(vec![pattern])?,
        Some(FilterSpec::Globs(patterns)) => compile_globs(patterns)?,
    };
    Ok(Some(CompiledFilter(predicate)))
}

/// An entry passes if its name matches a positive pattern and no `!`
/// pattern. With only `!` patterns, every name not excluded passes; an empty
/// list matches nothing.
fn compile_globs(patterns: Vec<String>) -> Result<Predicate, WalkError> {
    let (negative, positive): (Vec<String>, Vec<String>) =
        patterns.into_iter().partition(|p| p.starts_with('!'));
    let negative: Vec<String> = negative.into_iter().map(|p| p[1..].to_string()).collect();

    let positive = if positive.is_empty() && !negative.is_empty() {
        None
    } else {
        Some(build_set(&positive)?)
    };
    let negative = build_set(&negative)?;

    Ok(Arc::new(move |e: &Entry| -> Result<bool, BoxError> {
        let name = &e.dirent.file_name;
        let included = positive.as_ref().map_or(true, |set| set.is_match(name));
        Ok(included && !negative.is_match(name))
    }))
}

fn build_set(patterns: &[String]) -> Result<GlobSet, WalkError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| WalkError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| WalkError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}
