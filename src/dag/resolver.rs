// src/dag/resolver.rs

//! Expansion of dependency specifiers into concrete task names.
//!
//! A specifier is either an exact task name or a shell-style glob. Globs are
//! matched against the registered names; exact names resolve to themselves
//! whether or not they are registered (the executor reports missing ones).

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use globset::{Glob, GlobMatcher};

use crate::errors::{Result, TaskdagError};
use crate::types::TaskName;

const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Whether `spec` should be treated as a glob pattern.
pub fn is_glob(spec: &str) -> bool {
    spec.contains(GLOB_META)
}

/// Compile a glob specifier.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|source| TaskdagError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Resolves specifiers against a fixed list of registered names.
///
/// Compiled globs are cached, so one resolver should be reused for a whole
/// plan.
pub struct NameResolver<'a> {
    names: Vec<&'a str>,
    cache: HashMap<String, GlobMatcher>,
}

impl<'a> NameResolver<'a> {
    /// `names` must be in registry enumeration order.
    pub fn new<I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            names: names.into_iter().collect(),
            cache: HashMap::new(),
        }
    }

    /// Resolve a single specifier.
    pub fn resolve(&mut self, spec: &str) -> Result<Vec<TaskName>> {
        if !is_glob(spec) {
            return Ok(vec![spec.to_string()]);
        }

        let matcher = match self.cache.entry(spec.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(compile_pattern(spec)?),
        };

        Ok(self
            .names
            .iter()
            .filter(|name| matcher.is_match(name))
            .map(|name| name.to_string())
            .collect())
    }

    /// Resolve a dependency list into concrete names.
    ///
    /// Duplicates are removed (first occurrence wins). A glob that matches the
    /// task declaring it is kept like any other match; the planner reports it
    /// as a cycle.
    pub fn resolve_all(&mut self, specs: &[String]) -> Result<Vec<TaskName>> {
        let mut seen: HashSet<TaskName> = HashSet::new();
        let mut resolved = Vec::new();

        for spec in specs {
            for name in self.resolve(spec)? {
                if seen.insert(name.clone()) {
                    resolved.push(name);
                }
            }
        }

        Ok(resolved)
    }
}

/// One-shot helper around [`NameResolver::resolve`].
pub fn resolve_specifier<'a, I>(spec: &str, names: I) -> Result<Vec<TaskName>>
where
    I: IntoIterator<Item = &'a str>,
{
    NameResolver::new(names).resolve(spec)
}

/// One-shot helper around [`NameResolver::resolve_all`].
pub fn resolve_dependencies<'a, I>(specs: &[String], names: I) -> Result<Vec<TaskName>>
where
    I: IntoIterator<Item = &'a str>,
{
    NameResolver::new(names).resolve_all(specs)
}
