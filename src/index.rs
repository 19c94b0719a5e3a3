// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Index of a single parsed feature.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    ast::{Background, Child, Document, Node, ScenarioNode},
    parser::Parser,
    report::{self, Attribute},
    store::{Outlines, Sources},
    tracker::ScenarioTracker,
    Error, Result,
};

/// Parsed feature along with the data derived from it once: its tag
/// [`Attribute`]s and its [`Background`].
///
/// Immutable after being built, so may be shared between concurrently
/// running scenarios of the same feature.
#[derive(Clone, Debug)]
pub struct FeatureIndex {
    /// Parsed feature.
    document: Document,

    /// [`Attribute`]s of the feature tags.
    attributes: BTreeSet<Attribute>,

    /// [`Background`] of the feature, if it's the first child.
    background: Option<Node<Background>>,
}

impl FeatureIndex {
    /// Indexes the already parsed `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        let attributes = report::attributes(&document.tags);

        // Only the first child is checked: a background written anywhere
        // else is not recognized.
        let background = match document.children.first() {
            Some(Child::Background(bg)) => Some(bg.clone()),
            Some(Child::Scenario(_)) | None => None,
        };

        Self { document, attributes, background }
    }

    /// Parses the text registered for the `uri` in the [`Sources`] and
    /// indexes it.
    ///
    /// # Errors
    ///
    /// - [`Error::UnreadableSource`] if no text is registered for the `uri`.
    /// - [`Error::InvalidSource`] if the `parser` rejects the text.
    pub fn build<P: Parser + ?Sized>(
        sources: &Sources,
        parser: &P,
        uri: &str,
    ) -> Result<Self> {
        let text = sources
            .get(uri)
            .ok_or_else(|| Error::UnreadableSource { uri: uri.to_owned() })?;
        let document = parser.parse(uri, &text).map_err(|e| {
            Error::InvalidSource { uri: uri.to_owned(), reason: e.to_string() }
        })?;

        Ok(Self::new(document))
    }

    /// Builds the [`FeatureIndex`] of the `uri` and resolves the runtime
    /// scenario reference (`line` and `name`) in it.
    ///
    /// This re-parses the source on each call, prefer
    /// [`Features::for_scenario()`] for caching the index per URI.
    ///
    /// # Errors
    ///
    /// See [`FeatureIndex::build()`] and [`FeatureIndex::scenario()`] for
    /// details.
    ///
    /// [`Features::for_scenario()`]: crate::store::Features::for_scenario
    pub fn for_scenario<P: Parser + ?Sized>(
        sources: &Sources,
        parser: &P,
        uri: &str,
        line: usize,
        name: &str,
    ) -> Result<(Self, Node<ScenarioNode>)> {
        let index = Self::build(sources, parser, uri)?;
        let scenario = index.scenario(line, name)?;
        Ok((index, scenario))
    }

    /// URI of the indexed feature.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.document.uri
    }

    /// Indexed [`Document`].
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// [`Attribute`]s of the feature tags.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeSet<Attribute> {
        &self.attributes
    }

    /// [`Background`] of the feature, if it's the first child of the
    /// [`Document`].
    #[must_use]
    pub const fn background(&self) -> Option<&Node<Background>> {
        self.background.as_ref()
    }

    /// Resolves the static [`ScenarioNode`] the runtime reports as running
    /// on the `line` with the `name`.
    ///
    /// Scenarios are scanned in document order. A scenario matches when both
    /// its `line` and `name` are equal to the runtime ones. An [`Outline`]
    /// also matches when the `line` is the line of any of its example rows,
    /// as its iterations are renamed by substitutions.
    ///
    /// # Errors
    ///
    /// [`Error::ScenarioNotFound`] if nothing matches.
    ///
    /// [`Outline`]: crate::ast::Outline
    pub fn scenario(&self, line: usize, name: &str) -> Result<Node<ScenarioNode>> {
        self.document
            .scenarios()
            .find(|node| {
                let sc = node.definition();
                (sc.line == line && sc.name == name)
                    || node
                        .as_outline()
                        .is_some_and(|o| o.row_lines().any(|l| l == line))
            })
            .cloned()
            .ok_or_else(|| Error::ScenarioNotFound {
                uri: self.uri().to_owned(),
                line,
                name: name.to_owned(),
            })
    }

    /// Creates a [`ScenarioTracker`] for the scenario the runtime reports as
    /// running on the `line` with the `name` and `tags`.
    ///
    /// The returned tracker is fully primed: its tag [`Attribute`]s, step
    /// lines, pending [`Background`] steps and outline iteration are resolved.
    ///
    /// # Errors
    ///
    /// - [`Error::ScenarioNotFound`] if no scenario matches.
    /// - [`Error::OutlineIterationNotFound`] if the `line` is not an example
    ///   row of the matched outline.
    pub fn tracker<S: AsRef<str>>(
        &self,
        line: usize,
        name: &str,
        tags: &[S],
        outlines: &Outlines,
    ) -> Result<ScenarioTracker> {
        let node = self.scenario(line, name)?;

        let mut tracker = ScenarioTracker::new(self.uri(), node, line, name);
        tracker.process_tags(tags);
        tracker.process_scenario();
        tracker.process_background(self.background.clone());
        tracker.resolve_outline_iteration(outlines)?;

        debug!(
            uri = self.uri(),
            line,
            scenario = name,
            iteration = tracker.outline_iteration(),
            "tracking scenario",
        );
        Ok(tracker)
    }
}
