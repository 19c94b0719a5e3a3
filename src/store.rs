// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Run-wide stores shared between concurrently running scenarios.
//!
//! Every store is append-only: entries are inserted once (atomically per key)
//! and never mutated or removed while a run lasts. A fresh store is created
//! per run (or per test).

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use tracing::debug;

use crate::{
    ast::{Node, ScenarioNode},
    index::FeatureIndex,
    parser::Parser,
    Result,
};

/// Raw source texts of features, keyed by their URI.
#[derive(Debug, Default)]
pub struct Sources {
    /// Registered texts.
    texts: DashMap<String, Arc<str>>,
}

impl Sources {
    /// Creates a new empty [`Sources`] store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the raw `text` of the feature read from the `uri`.
    ///
    /// The first registration wins: returns `false` and leaves the store
    /// untouched if the `uri` is registered already.
    pub fn register(
        &self,
        uri: impl Into<String>,
        text: impl Into<Arc<str>>,
    ) -> bool {
        match self.texts.entry(uri.into()) {
            Entry::Occupied(e) => {
                debug!(uri = %e.key(), "source is registered already");
                false
            }
            Entry::Vacant(e) => {
                _ = e.insert(text.into());
                true
            }
        }
    }

    /// Returns the raw text registered for the `uri`, if any.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<Arc<str>> {
        self.texts.get(uri).map(|t| Arc::clone(t.value()))
    }

    /// Returns the number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Indicates whether no sources are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Built [`FeatureIndex`]es, keyed by their URI.
///
/// Only successfully built indexes are cached, so scenarios of a missing or
/// unparsable feature report the failure each time.
#[derive(Debug, Default)]
pub struct Features {
    /// Built indexes.
    indexes: DashMap<String, Arc<FeatureIndex>>,
}

impl Features {
    /// Creates a new empty [`Features`] store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the [`FeatureIndex`] of the `uri`, building it from the
    /// [`Sources`] on first use.
    ///
    /// # Errors
    ///
    /// See [`FeatureIndex::build()`] for details.
    pub fn get_or_build<P: Parser + ?Sized>(
        &self,
        sources: &Sources,
        parser: &P,
        uri: &str,
    ) -> Result<Arc<FeatureIndex>> {
        let cached = self.indexes.get(uri).map(|i| Arc::clone(i.value()));
        if let Some(index) = cached {
            return Ok(index);
        }

        debug!(uri, "building feature index");
        let built = Arc::new(FeatureIndex::build(sources, parser, uri)?);

        // Another scenario of the same feature may have won the race.
        let index = self.indexes.entry(uri.to_owned()).or_insert(built);
        Ok(Arc::clone(index.value()))
    }

    /// Resolves the runtime scenario reference (`line` and `name`) in the
    /// feature of the `uri`, returning its [`FeatureIndex`] along with the
    /// matched [`ScenarioNode`].
    ///
    /// # Errors
    ///
    /// See [`FeatureIndex::build()`] and [`FeatureIndex::scenario()`] for
    /// details.
    pub fn for_scenario<P: Parser + ?Sized>(
        &self,
        sources: &Sources,
        parser: &P,
        uri: &str,
        line: usize,
        name: &str,
    ) -> Result<(Arc<FeatureIndex>, Node<ScenarioNode>)> {
        let index = self.get_or_build(sources, parser, uri)?;
        let scenario = index.scenario(line, name)?;
        Ok((index, scenario))
    }

    /// Returns the number of cached indexes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Indicates whether no indexes are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

/// Lines of [`Outline`] example rows, keyed by the outline node identity.
///
/// Computed once per outline and reused by all of its iterations.
///
/// [`Outline`]: crate::ast::Outline
#[derive(Debug, Default)]
pub struct Outlines {
    /// Example row lines across all the `Examples` blocks, in declaration
    /// order.
    rows: DashMap<Node<ScenarioNode>, Arc<[usize]>>,
}

impl Outlines {
    /// Creates a new empty [`Outlines`] store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the example row lines of the `node`, or [`None`] if it's not
    /// an [`Outline`].
    ///
    /// [`Outline`]: crate::ast::Outline
    #[must_use]
    pub fn row_lines(&self, node: &Node<ScenarioNode>) -> Option<Arc<[usize]>> {
        let outline = node.as_outline()?;
        let lines = self
            .rows
            .entry(node.clone())
            .or_insert_with(|| outline.row_lines().collect());
        Some(Arc::clone(lines.value()))
    }

    /// Returns the number of cached outlines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Indicates whether no outlines are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::{
        parser::Basic,
        test_utils::common::{EATING, EATING_URI},
        Error,
    };

    use super::*;

    #[test]
    fn first_registration_wins() {
        let sources = Sources::new();

        assert!(sources.register("a.feature", "Feature: first\n"));
        assert!(!sources.register("a.feature", "Feature: second\n"));

        assert_eq!(sources.len(), 1);
        assert_eq!(sources.get("a.feature").as_deref(), Some("Feature: first\n"));
        assert_eq!(sources.get("b.feature"), None);
    }

    #[test]
    fn caches_built_indexes() {
        let sources = Sources::new();
        _ = sources.register(EATING_URI, EATING);
        let features = Features::new();

        let first = features
            .get_or_build(&sources, &Basic, EATING_URI)
            .expect("indexed");
        let second = features
            .get_or_build(&sources, &Basic, EATING_URI)
            .expect("indexed");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn does_not_cache_failures() {
        let sources = Sources::new();
        let features = Features::new();

        let err = features
            .get_or_build(&sources, &Basic, "missing.feature")
            .expect_err("nothing registered");

        assert_eq!(err, Error::UnreadableSource { uri: "missing.feature".into() });
        assert!(features.is_empty());
    }

    #[test]
    fn resolves_scenario_through_cache() {
        let sources = Sources::new();
        _ = sources.register(EATING_URI, EATING);
        let features = Features::new();

        let (index, node) = features
            .for_scenario(&sources, &Basic, EATING_URI, 33, "plain eating")
            .expect("resolved");

        assert_eq!(index.uri(), EATING_URI);
        assert_eq!(node.definition().line, 33);
    }

    #[test]
    fn computes_outline_rows_once() {
        let sources = Sources::new();
        _ = sources.register(EATING_URI, EATING);
        let features = Features::new();
        let outlines = Outlines::new();

        let (_, outline) = features
            .for_scenario(&sources, &Basic, EATING_URI, 24, "eating 5")
            .expect("resolved");
        let (_, plain) = features
            .for_scenario(&sources, &Basic, EATING_URI, 8, "plain eating")
            .expect("resolved");

        let first = outlines.row_lines(&outline).expect("outline");
        let second = outlines.row_lines(&outline).expect("outline");

        assert_eq!(&*first, &[24, 25, 29, 30, 31]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(outlines.row_lines(&plain), None);
        assert_eq!(outlines.len(), 1);
    }

    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Sources>();
        assert_send_sync::<Features>();
        assert_send_sync::<Outlines>();
    };

    #[test]
    fn registers_and_builds_concurrently() {
        const THREADS: usize = 8;

        let sources = Sources::new();
        let features = Features::new();

        let registered = thread::scope(|s| {
            let handles = (0..THREADS)
                .map(|_| s.spawn(|| sources.register(EATING_URI, EATING)))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().expect("joined"))
                .filter(|&won| won)
                .count()
        });
        assert_eq!(registered, 1);
        assert_eq!(sources.len(), 1);

        let indexes = thread::scope(|s| {
            let handles = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        features.get_or_build(&sources, &Basic, EATING_URI)
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().expect("joined").expect("indexed"))
                .collect::<Vec<_>>()
        });
        assert_eq!(indexes.len(), THREADS);
        assert!(indexes.iter().all(|i| Arc::ptr_eq(i, &indexes[0])));
        assert_eq!(features.len(), 1);
    }
}
