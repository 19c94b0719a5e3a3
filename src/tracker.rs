// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! State of a single running scenario.

use std::collections::{BTreeSet, HashMap, VecDeque};

use either::Either;

use crate::{
    ast::{Background, Node, ScenarioNode, Step},
    event::{HookType, Status},
    format::COLON_INFIX,
    report::{self, Attribute, ItemId},
    store::Outlines,
    Error, Result,
};

/// Mutable state of a running scenario, correlating its runtime events with
/// the static [`ScenarioNode`].
///
/// Created primed by [`FeatureIndex::tracker()`], mutated through the step
/// and hook events of its scenario, and consumed by [`ScenarioTracker::close()`]
/// once the scenario finishes. Never shared between scenarios.
///
/// [`FeatureIndex::tracker()`]: crate::FeatureIndex::tracker
#[derive(Debug)]
pub struct ScenarioTracker {
    /// URI of the feature.
    uri: String,

    /// Static scenario being run.
    scenario: Node<ScenarioNode>,

    /// Line reported by the runtime.
    line: usize,

    /// Name reported by the runtime.
    name: String,

    /// [`Background`] of the feature, if any.
    background: Option<Node<Background>>,

    /// [`Background`] steps not reported yet.
    pending: VecDeque<Node<Step>>,

    /// [`Step`]s of the scenario and its [`Background`] by their line.
    steps: HashMap<usize, Node<Step>>,

    /// [`Attribute`]s of the runtime tags.
    attributes: BTreeSet<Attribute>,

    /// `[n]` label of the running outline iteration.
    outline_iteration: Option<String>,

    /// Identifier assigned to the scenario by the reporting backend.
    id: Option<ItemId>,

    /// Currently open step or hook item.
    open: Option<OpenItem>,
}

/// Step or hook item of a scenario, opened in the reporting backend and not
/// finished yet.
#[derive(Clone, Debug)]
pub struct OpenItem {
    /// Identifier assigned by the reporting backend.
    pub id: ItemId,

    /// Hook or [`Step`] the item was opened for.
    pub target: Either<HookType, Node<Step>>,

    /// [`Status`] the item is finished with.
    pub status: Option<Status>,
}

impl ScenarioTracker {
    /// Creates a new unprimed [`ScenarioTracker`].
    pub(crate) fn new(
        uri: impl Into<String>,
        scenario: Node<ScenarioNode>,
        line: usize,
        name: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            scenario,
            line,
            name: name.into(),
            background: None,
            pending: VecDeque::new(),
            steps: HashMap::new(),
            attributes: BTreeSet::new(),
            outline_iteration: None,
            id: None,
            open: None,
        }
    }

    /// Converts the runtime `tags` into deduplicated [`Attribute`]s.
    pub(crate) fn process_tags<S: AsRef<str>>(&mut self, tags: &[S]) {
        self.attributes = report::attributes(tags);
    }

    /// Maps the scenario's own [`Step`]s by their lines.
    pub(crate) fn process_scenario(&mut self) {
        for st in &self.scenario.definition().steps {
            _ = self.steps.insert(st.line, st.clone());
        }
    }

    /// Maps the [`Background`] steps by their lines and enqueues them as
    /// pending.
    ///
    /// Lines already taken by the scenario's own steps keep them.
    pub(crate) fn process_background(
        &mut self,
        background: Option<Node<Background>>,
    ) {
        let Some(bg) = background else {
            return;
        };
        for st in &bg.steps {
            _ = self.steps.entry(st.line).or_insert_with(|| st.clone());
            self.pending.push_back(st.clone());
        }
        self.background = Some(bg);
    }

    /// Resolves the `[n]` label of the running outline iteration.
    ///
    /// `n` is the 1-based position of the [`running_line()`] among the
    /// example rows of all the outline `Examples` blocks. Does nothing for
    /// plain scenarios.
    ///
    /// # Errors
    ///
    /// [`Error::OutlineIterationNotFound`] if the [`running_line()`] is not
    /// an example row of the outline.
    ///
    /// [`running_line()`]: ScenarioTracker::running_line
    pub(crate) fn resolve_outline_iteration(
        &mut self,
        outlines: &Outlines,
    ) -> Result<()> {
        let Some(rows) = outlines.row_lines(&self.scenario) else {
            return Ok(());
        };

        let line = self.running_line();
        let pos = rows.iter().position(|&l| l == line).ok_or_else(|| {
            Error::OutlineIterationNotFound {
                uri: self.uri.clone(),
                line,
                name: self.name.clone(),
            }
        })?;
        self.outline_iteration = Some(format!("[{}]", pos + 1));
        Ok(())
    }

    /// URI of the feature.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Static scenario being run.
    #[must_use]
    pub const fn scenario(&self) -> &Node<ScenarioNode> {
        &self.scenario
    }

    /// Static name of the scenario.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.scenario.definition().name
    }

    /// Keyword of the scenario.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.scenario.definition().keyword
    }

    /// Line the scenario runs on: the runtime one for outline iterations,
    /// or the declared one otherwise.
    #[must_use]
    pub fn running_line(&self) -> usize {
        if self.scenario.is_outline() {
            self.line
        } else {
            self.scenario.definition().line
        }
    }

    /// `[n]` label of the running outline iteration, if the scenario is an
    /// outline.
    #[must_use]
    pub fn outline_iteration(&self) -> Option<&str> {
        self.outline_iteration.as_deref()
    }

    /// [`Attribute`]s of the runtime tags.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeSet<Attribute> {
        &self.attributes
    }

    /// [`Background`] of the feature, if any.
    #[must_use]
    pub const fn background(&self) -> Option<&Node<Background>> {
        self.background.as_ref()
    }

    /// Number of [`Background`] steps not reported yet.
    #[must_use]
    pub fn pending_background(&self) -> usize {
        self.pending.len()
    }

    /// Prefix of the step names: the uppercased [`Background`] keyword
    /// followed by [`COLON_INFIX`] while its steps are pending, or empty
    /// otherwise.
    #[must_use]
    pub fn step_prefix(&self) -> String {
        match &self.background {
            Some(bg) if !self.pending.is_empty() => {
                format!("{}{COLON_INFIX}", bg.keyword.to_uppercase())
            }
            Some(_) | None => String::new(),
        }
    }

    /// Returns the [`Step`] of the scenario or its [`Background`] written on
    /// the `line`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownStepLine`] if there is no such [`Step`], meaning the
    /// runtime events are out of order or belong to another scenario.
    pub fn lookup_step(&self, line: usize) -> Result<Node<Step>> {
        self.steps.get(&line).cloned().ok_or_else(|| Error::UnknownStepLine {
            uri: self.uri.clone(),
            line: self.running_line(),
            name: self.name.clone(),
            step_line: line,
        })
    }

    /// Marks the next pending [`Background`] step as reported.
    pub fn dequeue_background_step(&mut self) -> Option<Node<Step>> {
        self.pending.pop_front()
    }

    /// Identifier assigned to the scenario by the reporting backend.
    #[must_use]
    pub const fn id(&self) -> Option<&ItemId> {
        self.id.as_ref()
    }

    /// Assigns the identifier of the scenario in the reporting backend.
    ///
    /// # Errors
    ///
    /// [`Error::IdentifierReassigned`] if an identifier is assigned already,
    /// leaving it unchanged.
    pub fn assign_identifier(&mut self, id: ItemId) -> Result<()> {
        if self.id.is_some() {
            return Err(Error::IdentifierReassigned {
                uri: self.uri.clone(),
                line: self.running_line(),
                name: self.name.clone(),
            });
        }
        self.id = Some(id);
        Ok(())
    }

    /// Remembers the step or hook item opened in the reporting backend,
    /// returning the previously open one (if it wasn't finished).
    pub fn open_item(
        &mut self,
        id: ItemId,
        target: Either<HookType, Node<Step>>,
    ) -> Option<OpenItem> {
        self.open.replace(OpenItem { id, target, status: None })
    }

    /// Currently open step or hook item, if any.
    #[must_use]
    pub const fn current_item(&self) -> Option<&OpenItem> {
        self.open.as_ref()
    }

    /// Takes the currently open item, recording the `status` it finishes
    /// with.
    pub fn finish_item(&mut self, status: Status) -> Option<OpenItem> {
        self.open.take().map(|item| OpenItem { status: Some(status), ..item })
    }

    /// Closes this tracker once its scenario finishes, returning the
    /// identifier assigned to the scenario (if any).
    #[must_use]
    pub fn close(self) -> Option<ItemId> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        index::FeatureIndex,
        test_utils::common::{colliding_document, eating_index},
    };

    use super::*;

    fn plain() -> ScenarioTracker {
        eating_index()
            .tracker::<&str>(8, "plain eating", &[], &Outlines::new())
            .expect("tracker")
    }

    #[test]
    fn resolves_iterations_across_examples_blocks() {
        let index = eating_index();
        let outlines = Outlines::new();

        let labels = [24, 25, 29, 30, 31]
            .into_iter()
            .map(|line| {
                let tr = index
                    .tracker::<&str>(line, "eating", &[], &outlines)
                    .expect("tracker");
                assert_eq!(tr.running_line(), line);
                tr.outline_iteration().map(ToOwned::to_owned)
            })
            .collect::<Vec<_>>();

        assert_eq!(
            labels,
            ["[1]", "[2]", "[3]", "[4]", "[5]"].map(|l| Some(l.to_owned())),
        );
        assert_eq!(outlines.len(), 1);
    }

    #[test]
    fn fails_on_unknown_outline_row() {
        let index = eating_index();
        let node = index.scenario(24, "eating").expect("outline");

        let mut tracker = ScenarioTracker::new(index.uri(), node, 99, "eating");
        let err = tracker
            .resolve_outline_iteration(&Outlines::new())
            .expect_err("no such row");

        assert_eq!(
            err,
            Error::OutlineIterationNotFound {
                uri: index.uri().to_owned(),
                line: 99,
                name: "eating".into(),
            },
        );
        assert_eq!(tracker.outline_iteration(), None);
    }

    #[test]
    fn plain_scenarios_run_on_declared_line() {
        let tracker = plain();

        assert_eq!(tracker.running_line(), 8);
        assert_eq!(tracker.outline_iteration(), None);
        assert_eq!(tracker.keyword(), "Scenario");
        assert_eq!(tracker.name(), "plain eating");
    }

    #[test]
    fn background_prefix_lasts_while_pending() {
        let mut tracker = plain();

        assert_eq!(tracker.pending_background(), 2);
        assert_eq!(tracker.step_prefix(), "BACKGROUND: ");

        let first = tracker.dequeue_background_step().expect("first");
        assert_eq!(first.line, 5);
        assert_eq!(tracker.pending_background(), 1);
        assert_eq!(tracker.step_prefix(), "BACKGROUND: ");

        let second = tracker.dequeue_background_step().expect("second");
        assert_eq!(second.line, 6);
        assert_eq!(tracker.pending_background(), 0);
        assert_eq!(tracker.step_prefix(), "");

        assert!(tracker.dequeue_background_step().is_none());
        assert_eq!(tracker.pending_background(), 0);
    }

    #[test]
    fn no_prefix_without_background() {
        let mut doc = colliding_document();
        _ = doc.children.remove(0);
        let index = FeatureIndex::new(doc);

        let tracker = index
            .tracker::<&str>(6, "colliding", &[], &Outlines::new())
            .expect("tracker");

        assert!(tracker.background().is_none());
        assert_eq!(tracker.pending_background(), 0);
        assert_eq!(tracker.step_prefix(), "");
    }

    #[test]
    fn looks_up_background_and_scenario_steps() {
        let tracker = plain();

        assert_eq!(tracker.lookup_step(5).expect("bg").text, "there are cucumbers");
        assert_eq!(tracker.lookup_step(9).expect("own").text, "I eat cucumbers");

        let err = tracker.lookup_step(34).expect_err("other scenario");
        assert_eq!(
            err,
            Error::UnknownStepLine {
                uri: tracker.uri().to_owned(),
                line: 8,
                name: "plain eating".into(),
                step_line: 34,
            },
        );
    }

    #[test]
    fn scenario_step_wins_line_collision() {
        let index = FeatureIndex::new(colliding_document());
        let tracker = index
            .tracker::<&str>(6, "colliding", &[], &Outlines::new())
            .expect("tracker");

        assert_eq!(tracker.lookup_step(3).expect("step").text, "a scenario step");
        assert_eq!(
            tracker.lookup_step(4).expect("step").text,
            "another background step",
        );
        assert_eq!(tracker.pending_background(), 2);
    }

    #[test]
    fn identifier_is_assigned_once() {
        let mut tracker = plain();

        tracker.assign_identifier(ItemId::from("first")).expect("first");
        let err = tracker
            .assign_identifier(ItemId::from("second"))
            .expect_err("second");

        assert!(matches!(err, Error::IdentifierReassigned { .. }));
        assert_eq!(tracker.id(), Some(&ItemId::from("first")));
        assert_eq!(tracker.close(), Some(ItemId::from("first")));
    }

    #[test]
    fn deduplicates_tags() {
        let index = eating_index();
        let tracker = index
            .tracker(8, "plain eating", &["@a", "@b", "@a"], &Outlines::new())
            .expect("tracker");

        let values = tracker
            .attributes()
            .iter()
            .map(|a| a.value.as_str())
            .collect::<Vec<_>>();
        assert_eq!(values, ["@a", "@b"]);
    }

    #[test]
    fn tracks_open_items() {
        let mut tracker = plain();
        let step = tracker.lookup_step(9).expect("step");

        assert!(tracker.open_item("s1".into(), Either::Right(step)).is_none());
        assert_eq!(tracker.current_item().map(|i| i.id.clone()), Some("s1".into()));

        let finished = tracker.finish_item(Status::Failed).expect("open");
        assert_eq!(finished.status, Some(Status::Failed));
        assert!(tracker.current_item().is_none());

        _ = tracker.open_item("h1".into(), Either::Left(HookType::After));
        let replaced = tracker.open_item("h2".into(), Either::Left(HookType::After));
        assert_eq!(replaced.map(|i| i.id), Some("h1".into()));
    }
}
