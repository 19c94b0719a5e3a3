// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Reporter`] translating runtime [`Event`]s into backend test items.
//!
//! Items form a `STORY` (feature) → `SCENARIO` → `STEP`/hook hierarchy.

use either::Either;
use linked_hash_map::LinkedHashMap;
use tracing::{debug, error, warn};

use crate::{
    ast::Argument,
    backend::Backend,
    cli::Cli,
    event::{self, Event, HookType, Status},
    format::{self, COLON_INFIX},
    index::FeatureIndex,
    metadata::{StepMetadata, StepRef, Unknown},
    parser::{Basic, Parser},
    report::{
        self, FinishItem, ItemId, ItemStatus, ItemType, LogEntry, LogLevel,
        StartItem,
    },
    store::{Features, Outlines, Sources},
    tracker::ScenarioTracker,
    Result,
};

/// Reporter of runtime [`Event`]s to a [`Backend`].
///
/// Expects the [`Event`]s of a single scenario to arrive in order, with no
/// interleaving between scenarios. Scenarios of the same feature share a
/// single cached [`FeatureIndex`].
///
/// Only one scenario is followed at a time: a [`ScenarioStarted`] arriving
/// before the running scenario is finished finishes that one as skipped.
/// Scenarios executed concurrently should either have their [`Event`]s
/// serialized per scenario, or be reported by a separate [`Reporter`] each.
///
/// [`ScenarioStarted`]: Event::ScenarioStarted
#[derive(Debug)]
pub struct Reporter<B, M = Unknown, P = Basic> {
    /// [`Backend`] receiving test items.
    backend: B,

    /// Provider of step definitions metadata.
    metadata: M,

    /// [`Parser`] of feature sources.
    parser: P,

    /// Options of this [`Reporter`].
    cli: Cli,

    /// Raw sources of features.
    sources: Sources,

    /// Built [`FeatureIndex`]es.
    features: Features,

    /// Example row lines of outlines.
    outlines: Outlines,

    /// Started `STORY` items, keyed by the feature URI.
    stories: LinkedHashMap<String, ItemId>,

    /// Currently running scenario.
    current: Option<Running>,
}

/// Scenario currently handled by a [`Reporter`].
#[derive(Debug)]
enum Running {
    /// Scenario correlated with its parsed feature.
    Tracked(ScenarioTracker),

    /// Scenario of an unreadable or unparsable feature, reported with the
    /// runtime data only.
    Untracked {
        /// URI of the feature.
        uri: String,

        /// Identifier of the scenario item.
        id: ItemId,

        /// Identifier of the open step or hook item, if any.
        open: Option<ItemId>,
    },

    /// Scenario failed to be correlated, so its events are ignored.
    Aborted,
}

impl<B: Backend> Reporter<B> {
    /// Creates a new [`Reporter`] with default options, no step metadata and
    /// the [`Basic`] parser.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            metadata: Unknown,
            parser: Basic,
            cli: Cli::default(),
            sources: Sources::new(),
            features: Features::new(),
            outlines: Outlines::new(),
            stories: LinkedHashMap::new(),
            current: None,
        }
    }
}

impl<B, M, P> Reporter<B, M, P> {
    /// Replaces the options of this [`Reporter`].
    #[must_use]
    pub fn with_cli(mut self, cli: Cli) -> Self {
        self.cli = cli;
        self
    }

    /// Replaces the [`StepMetadata`] provider of this [`Reporter`].
    #[must_use]
    pub fn with_metadata<Meta: StepMetadata>(
        self,
        metadata: Meta,
    ) -> Reporter<B, Meta, P> {
        let Self {
            backend,
            parser,
            cli,
            sources,
            features,
            outlines,
            stories,
            current,
            ..
        } = self;
        Reporter {
            backend,
            metadata,
            parser,
            cli,
            sources,
            features,
            outlines,
            stories,
            current,
        }
    }

    /// Replaces the [`Parser`] of this [`Reporter`].
    #[must_use]
    pub fn with_parser<Par: Parser>(self, parser: Par) -> Reporter<B, M, Par> {
        let Self {
            backend,
            metadata,
            cli,
            sources,
            features,
            outlines,
            stories,
            current,
            ..
        } = self;
        Reporter {
            backend,
            metadata,
            parser,
            cli,
            sources,
            features,
            outlines,
            stories,
            current,
        }
    }

    /// [`Backend`] of this [`Reporter`].
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Consumes this [`Reporter`], returning its [`Backend`].
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Options of this [`Reporter`].
    #[must_use]
    pub const fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Raw sources of features registered so far.
    #[must_use]
    pub const fn sources(&self) -> &Sources {
        &self.sources
    }

    /// [`FeatureIndex`]es built so far.
    #[must_use]
    pub const fn features(&self) -> &Features {
        &self.features
    }
}

impl<B, M, P> Reporter<B, M, P>
where
    B: Backend,
    M: StepMetadata,
    P: Parser,
{
    /// Handles the given runtime [`Event`].
    ///
    /// # Errors
    ///
    /// - If the started scenario can't be found in its feature, or its
    ///   outline iteration can't be resolved. The remaining events of that
    ///   scenario are ignored then.
    /// - If a step line doesn't belong to the running scenario.
    /// - If the running scenario is assigned an identifier twice.
    pub async fn handle_event(&mut self, ev: Event) -> Result<()> {
        match ev {
            Event::SourceRead { uri, text } => {
                _ = self.sources.register(uri, text);
                Ok(())
            }
            Event::ScenarioStarted(sc) => self.scenario_started(sc).await,
            Event::StepStarted(st) => self.step_started(st).await,
            Event::StepFinished(st) => self.step_finished(st).await,
            Event::HookStarted(hook) => {
                self.hook_started(hook).await;
                Ok(())
            }
            Event::HookFinished { hook, status, error } => {
                self.hook_finished(hook, status, error).await;
                Ok(())
            }
            Event::ScenarioFinished { status } => {
                self.scenario_finished(status).await;
                Ok(())
            }
        }
    }

    /// Finishes all the started `STORY` items.
    ///
    /// Should be called once all the runtime [`Event`]s are handled.
    pub async fn finish(&mut self) {
        if self.current.is_some() {
            warn!("finishing reporter with a scenario still running");
            self.scenario_finished(Status::Skipped).await;
        }
        while let Some((uri, id)) = self.stories.pop_front() {
            debug!(%uri, "finishing feature");
            self.backend.finish_item(&id, FinishItem::new(None)).await;
        }
    }

    /// Starts reporting the scenario, along with its feature (if it's the
    /// first scenario of that feature).
    async fn scenario_started(
        &mut self,
        sc: event::ScenarioStarted,
    ) -> Result<()> {
        if self.current.is_some() {
            warn!(
                uri = %sc.uri,
                line = sc.line,
                scenario = %sc.name,
                "scenario started before the previous one finished",
            );
            self.scenario_finished(Status::Skipped).await;
        }

        let index = match self.features.get_or_build(
            &self.sources,
            &self.parser,
            &sc.uri,
        ) {
            Ok(index) => index,
            Err(e) if e.is_document_error() => {
                warn!(
                    uri = %sc.uri,
                    line = sc.line,
                    scenario = %sc.name,
                    "reporting scenario untracked: {e}",
                );
                return self.start_untracked(sc).await;
            }
            Err(e) => return Err(e),
        };

        let mut tracker =
            match index.tracker(sc.line, &sc.name, &sc.tags, &self.outlines) {
                Ok(tracker) => tracker,
                Err(e) => {
                    error!(
                        uri = %sc.uri,
                        line = sc.line,
                        scenario = %sc.name,
                        "failed to track scenario: {e}",
                    );
                    self.current = Some(Running::Aborted);
                    return Err(e);
                }
            };

        let story = self.story(&sc.uri, Some(&*index)).await;

        let keyword = format!("{}{COLON_INFIX}", tracker.keyword());
        let mut rq = StartItem::new(
            format::render_name(
                None,
                &keyword,
                &sc.name,
                tracker.outline_iteration(),
            ),
            ItemType::Scenario,
        );
        rq.description = Some(sc.uri.clone());
        rq.code_ref = Some(format::code_ref(&sc.uri, tracker.running_line()));
        rq.attributes = tracker.attributes().clone();

        let id = self.backend.start_item(Some(&story), rq).await;
        let assigned = tracker.assign_identifier(id);
        self.current = Some(Running::Tracked(tracker));
        assigned
    }

    /// Starts reporting the scenario of a feature which can't be parsed.
    async fn start_untracked(
        &mut self,
        sc: event::ScenarioStarted,
    ) -> Result<()> {
        let story = self.story(&sc.uri, None).await;

        let mut rq = StartItem::new(sc.name, ItemType::Scenario);
        rq.code_ref = Some(format::code_ref(&sc.uri, sc.line));
        rq.description = Some(sc.uri.clone());
        rq.attributes = report::attributes(&sc.tags);

        let id = self.backend.start_item(Some(&story), rq).await;
        self.current =
            Some(Running::Untracked { uri: sc.uri, id, open: None });
        Ok(())
    }

    /// Returns the `STORY` item of the feature with the given `uri`,
    /// starting it if it's not started yet.
    async fn story(
        &mut self,
        uri: &str,
        index: Option<&FeatureIndex>,
    ) -> ItemId {
        if let Some(id) = self.stories.get(uri) {
            return id.clone();
        }

        let mut rq = match index {
            Some(index) => {
                let doc = index.document();
                let mut rq = StartItem::new(
                    format!("{}{COLON_INFIX}{}", doc.keyword, doc.name),
                    ItemType::Story,
                );
                rq.attributes = index.attributes().clone();
                rq
            }
            None => StartItem::new(uri, ItemType::Story),
        };
        rq.description = Some(uri.to_owned());
        rq.code_ref = Some(uri.to_owned());

        debug!(uri, "starting feature");
        let id = self.backend.start_item(None, rq).await;
        _ = self.stories.insert(uri.to_owned(), id.clone());
        id
    }

    /// Starts reporting the step of the running scenario.
    async fn step_started(&mut self, st: event::StepStarted) -> Result<()> {
        let Some(mut running) = self.current.take() else {
            warn!(line = st.line, "step started outside of any scenario");
            return Ok(());
        };
        let res = self.start_step(&mut running, st).await;
        self.current = Some(running);
        res
    }

    /// Starts a step item under the `running` scenario, resolving the static
    /// step behind the event.
    async fn start_step(
        &mut self,
        running: &mut Running,
        st: event::StepStarted,
    ) -> Result<()> {
        match running {
            Running::Tracked(tracker) => {
                let step = tracker.lookup_step(st.line)?;

                let prefix = if self.cli.rp_no_background_prefix {
                    String::new()
                } else {
                    tracker.step_prefix()
                };
                let argument = st.argument.as_ref().or(step.argument.as_ref());
                let mut rq = StartItem::new(
                    format::render_name(
                        Some(&prefix),
                        &step.keyword,
                        &st.text,
                        None,
                    ),
                    ItemType::Step,
                );
                rq.description = self.describe(argument);
                rq.parameters =
                    format::extract_parameters(&step.text, &st.arguments);
                self.enrich(&mut rq, tracker.uri(), &st);

                let Some(parent) = tracker.id().cloned() else {
                    return Ok(());
                };
                if let Some(prev) = tracker.finish_item(Status::Skipped) {
                    self.close_replaced(&prev.id).await;
                }
                let id = self.backend.start_item(Some(&parent), rq).await;
                _ = tracker.open_item(id, Either::Right(step));
            }
            Running::Untracked { uri, id, open } => {
                let mut rq = StartItem::new(st.text.clone(), ItemType::Step);
                rq.description = self.describe(st.argument.as_ref());
                self.enrich(&mut rq, uri, &st);

                if let Some(prev) = open.take() {
                    self.close_replaced(&prev).await;
                }
                *open = Some(self.backend.start_item(Some(&*id), rq).await);
            }
            Running::Aborted => {}
        }
        Ok(())
    }

    /// Finishes reporting the step of the running scenario.
    async fn step_finished(&mut self, st: event::StepFinished) -> Result<()> {
        let Some(mut running) = self.current.take() else {
            warn!(line = st.line, "step finished outside of any scenario");
            return Ok(());
        };
        let res = self.finish_step(&mut running, st).await;
        self.current = Some(running);
        res
    }

    /// Finishes the open step item of the `running` scenario.
    async fn finish_step(
        &mut self,
        running: &mut Running,
        st: event::StepFinished,
    ) -> Result<()> {
        match running {
            Running::Tracked(tracker) => {
                _ = tracker.lookup_step(st.line)?;
                _ = tracker.dequeue_background_step();

                let is_step = tracker
                    .current_item()
                    .is_some_and(|i| i.target.is_right());
                if !is_step {
                    warn!(
                        uri = tracker.uri(),
                        line = st.line,
                        scenario = tracker.name(),
                        "finished step wasn't started",
                    );
                    return Ok(());
                }
                if let Some(item) = tracker.finish_item(st.status) {
                    self.close_item(&item.id, st.status, st.error).await;
                }
            }
            Running::Untracked { open, .. } => {
                if let Some(id) = open.take() {
                    self.close_item(&id, st.status, st.error).await;
                }
            }
            Running::Aborted => {}
        }
        Ok(())
    }

    /// Starts reporting the hook of the running scenario.
    async fn hook_started(&mut self, hook: HookType) {
        let Some(mut running) = self.current.take() else {
            warn!(%hook, "hook started outside of any scenario");
            return;
        };
        self.start_hook(&mut running, hook).await;
        self.current = Some(running);
    }

    /// Starts a hook item under the `running` scenario, finishing the item
    /// it replaces.
    async fn start_hook(&mut self, running: &mut Running, hook: HookType) {
        let (item_type, name) = ItemType::of_hook(hook);
        let rq = StartItem::new(name, item_type);

        match running {
            Running::Tracked(tracker) => {
                let Some(parent) = tracker.id().cloned() else {
                    return;
                };
                if let Some(prev) = tracker.finish_item(Status::Skipped) {
                    self.close_replaced(&prev.id).await;
                }
                let id = self.backend.start_item(Some(&parent), rq).await;
                _ = tracker.open_item(id, Either::Left(hook));
            }
            Running::Untracked { id, open, .. } => {
                if let Some(prev) = open.take() {
                    self.close_replaced(&prev).await;
                }
                *open = Some(self.backend.start_item(Some(&*id), rq).await);
            }
            Running::Aborted => {}
        }
    }

    /// Finishes reporting the hook of the running scenario.
    async fn hook_finished(
        &mut self,
        hook: HookType,
        status: Status,
        err: Option<String>,
    ) {
        let id = match &mut self.current {
            Some(Running::Tracked(tracker)) => {
                match tracker.current_item().map(|i| &i.target) {
                    Some(Either::Left(h)) if *h == hook => {}
                    Some(_) | None => {
                        warn!(%hook, "finished hook wasn't started");
                        return;
                    }
                }
                tracker.finish_item(status).map(|i| i.id)
            }
            Some(Running::Untracked { open, .. }) => open.take(),
            Some(Running::Aborted) => None,
            None => {
                warn!(%hook, "hook finished outside of any scenario");
                None
            }
        };
        if let Some(id) = id {
            self.close_item(&id, status, err).await;
        }
    }

    /// Finishes reporting the running scenario, along with its item left
    /// open (if any).
    async fn scenario_finished(&mut self, status: Status) {
        let (id, open) = match self.current.take() {
            Some(Running::Tracked(mut tracker)) => {
                let open = tracker.finish_item(Status::Skipped).map(|i| i.id);
                (tracker.close(), open)
            }
            Some(Running::Untracked { id, open, .. }) => (Some(id), open),
            Some(Running::Aborted) => (None, None),
            None => {
                warn!("scenario finished without being started");
                (None, None)
            }
        };

        if let Some(open) = open {
            warn!(%open, "finishing item left open");
            self.close_item(&open, Status::Skipped, None).await;
        }
        if let Some(id) = id {
            self.backend
                .finish_item(&id, FinishItem::new(Some(status.into())))
                .await;
        }
    }

    /// Finishes the item left open by a newly started step or hook as
    /// skipped.
    async fn close_replaced(&mut self, id: &ItemId) {
        warn!(%id, "item is left unfinished, finishing as skipped");
        self.close_item(id, Status::Skipped, None).await;
    }

    /// Logs the `err` (if any) and finishes the item with the given `id`.
    async fn close_item(
        &mut self,
        id: &ItemId,
        status: Status,
        err: Option<String>,
    ) {
        if let Some(msg) = err {
            self.backend
                .log(id, LogEntry::new(LogLevel::from(status), msg))
                .await;
        }
        self.backend
            .finish_item(id, FinishItem::new(Some(ItemStatus::from(status))))
            .await;
    }

    /// Renders the description of a step out of its multiline `argument`.
    fn describe(&self, argument: Option<&Argument>) -> Option<String> {
        let out = format::multiline_argument(argument, self.cli.rp_table_indent);
        (!out.is_empty()).then_some(out)
    }

    /// Enriches the step request with the metadata of its definition.
    fn enrich(&self, rq: &mut StartItem, uri: &str, st: &event::StepStarted) {
        let meta = self.metadata.lookup(&StepRef {
            uri,
            line: st.line,
            text: &st.text,
            arguments: &st.arguments,
            argument: st.argument.as_ref(),
        });

        rq.test_case_id = meta.test_case_id.or_else(|| {
            format::test_case_id(meta.code_ref.as_deref(), &st.arguments)
        });
        rq.code_ref = meta.code_ref;
        if let Some(attrs) = meta.attributes {
            rq.attributes = attrs;
        }
        rq.has_stats = !self.cli.rp_steps_without_stats;
    }
}
