// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Metadata of step definitions, enriching reported step items.

use std::collections::BTreeSet;

use crate::{ast::Argument, report::Attribute};

/// Reference to a running step, as the runtime reports it.
#[derive(Clone, Copy, Debug)]
pub struct StepRef<'s> {
    /// URI of the feature.
    pub uri: &'s str,

    /// Line of the step.
    pub line: usize,

    /// Step text, with outline placeholders substituted.
    pub text: &'s str,

    /// Values matched by the step definition, in order.
    pub arguments: &'s [String],

    /// Multiline argument of the step.
    pub argument: Option<&'s Argument>,
}

/// Metadata of a step definition.
///
/// Every field is optional: absent ones are simply not reported.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Metadata {
    /// Reference to the code of the step definition.
    pub code_ref: Option<String>,

    /// Additional [`Attribute`]s of the step item.
    pub attributes: Option<BTreeSet<Attribute>>,

    /// Stable test case identifier of the step.
    pub test_case_id: Option<String>,
}

/// Provider of step definition [`Metadata`].
pub trait StepMetadata {
    /// Looks up the [`Metadata`] of the definition matched by the `step`.
    ///
    /// Misses must be reported as the default (all-absent) [`Metadata`].
    fn lookup(&self, step: &StepRef<'_>) -> Metadata;
}

impl<F> StepMetadata for F
where
    F: Fn(&StepRef<'_>) -> Metadata,
{
    fn lookup(&self, step: &StepRef<'_>) -> Metadata {
        self(step)
    }
}

/// [`StepMetadata`] knowing nothing about step definitions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unknown;

impl StepMetadata for Unknown {
    fn lookup(&self, _: &StepRef<'_>) -> Metadata {
        Metadata::default()
    }
}
