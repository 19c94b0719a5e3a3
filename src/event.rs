// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runtime events emitted by a test engine while executing features.
//!
//! The engine has already flattened scenario outlines into concrete cases,
//! so events only refer to sources by URI and line.

use derive_more::with_trait::Display;

use crate::ast::Argument;

/// Runtime event of a test engine.
#[derive(Clone, Debug)]
pub enum Event {
    /// Raw text of a feature was read.
    SourceRead {
        /// URI the text was read from.
        uri: String,

        /// Raw text.
        text: String,
    },

    /// Scenario (or an outline iteration) started.
    ScenarioStarted(ScenarioStarted),

    /// Step started.
    StepStarted(StepStarted),

    /// Step finished.
    StepFinished(StepFinished),

    /// Hook started.
    HookStarted(HookType),

    /// Hook finished.
    HookFinished {
        /// Type of the finished hook.
        hook: HookType,

        /// Outcome of the hook.
        status: Status,

        /// Error message, if the hook failed.
        error: Option<String>,
    },

    /// Scenario finished.
    ScenarioFinished {
        /// Outcome of the scenario.
        status: Status,
    },
}

/// Scenario reference reported by the runtime when it starts.
#[derive(Clone, Debug)]
pub struct ScenarioStarted {
    /// URI of the feature.
    pub uri: String,

    /// Line of the scenario, or of the example row for outline iterations.
    pub line: usize,

    /// Name of the scenario, with outline placeholders substituted.
    pub name: String,

    /// Tags of the scenario, including the inherited ones.
    pub tags: Vec<String>,
}

/// Step reference reported by the runtime when it starts.
#[derive(Clone, Debug)]
pub struct StepStarted {
    /// Line of the step.
    pub line: usize,

    /// Step text, with outline placeholders substituted.
    pub text: String,

    /// Values matched by the step definition, in order.
    pub arguments: Vec<String>,

    /// Multiline argument, with outline placeholders substituted.
    pub argument: Option<Argument>,
}

/// Outcome of a step reported by the runtime.
#[derive(Clone, Debug)]
pub struct StepFinished {
    /// Line of the step.
    pub line: usize,

    /// Outcome of the step.
    pub status: Status,

    /// Error message, if the step failed.
    pub error: Option<String>,
}

/// Type of a hook.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum HookType {
    /// Executing before each scenario.
    Before,

    /// Executing after each scenario.
    After,

    /// Executing before each step.
    BeforeStep,

    /// Executing after each step.
    AfterStep,
}

/// Outcome of a step, hook or scenario.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Status {
    /// Passed.
    Passed,

    /// Failed.
    Failed,

    /// Skipped.
    Skipped,

    /// Marked as pending.
    Pending,

    /// Matched more than one step definition.
    Ambiguous,

    /// Matched no step definition.
    Undefined,

    /// Step definition wasn't used.
    Unused,
}
