// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Owned, immutable tree of a parsed `.feature` document.
//!
//! The tree is produced once by a [`Parser`] and never mutated afterwards.
//! Nodes that are referenced from running scenarios are wrapped into a
//! [`Node`], so they can be shared cheaply and compared by identity.
//!
//! [`Parser`]: crate::Parser

use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

use derive_more::with_trait::{Deref, From};

/// Shared handle to a node of a parsed [`Document`].
///
/// [`Clone`] is cheap, while [`PartialEq`] and [`Hash`] are based on the node
/// identity (its address), not on its contents: two equally written scenarios
/// of one feature are still different nodes.
#[derive(Debug, Deref, From)]
#[deref(forward)]
pub struct Node<T>(Arc<T>);

impl<T> Node<T> {
    /// Wraps the provided `value` into a new [`Node`].
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }
}

// Manual implementation is required to omit the redundant `T: Clone` trait
// bound imposed by `#[derive(Clone)]`.
impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Eq for Node<T> {}

impl<T> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Hash for Node<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

/// Parsed feature document.
#[derive(Clone, Debug)]
pub struct Document {
    /// URI (or path) the document was read from.
    pub uri: String,

    /// Feature keyword, as written (`Feature`, `Ability`, ...).
    pub keyword: String,

    /// Feature name.
    pub name: String,

    /// Feature tags, each starting with `@`.
    pub tags: Vec<String>,

    /// Top-level children in document order.
    ///
    /// Normally zero or one [`Background`] followed by scenarios, but only the
    /// first child is ever considered to be the [`Background`] of the feature.
    pub children: Vec<Child>,
}

impl Document {
    /// Iterates over all the [`ScenarioNode`]s of this [`Document`], skipping
    /// [`Background`]s.
    pub fn scenarios(&self) -> impl Iterator<Item = &Node<ScenarioNode>> {
        self.children.iter().filter_map(|ch| match ch {
            Child::Scenario(sc) => Some(sc),
            Child::Background(_) => None,
        })
    }
}

/// Top-level child of a [`Document`].
#[derive(Clone, Debug)]
pub enum Child {
    /// Steps implicitly prefixed to every scenario.
    Background(Node<Background>),

    /// Plain scenario or scenario outline.
    Scenario(Node<ScenarioNode>),
}

/// Background of a feature.
#[derive(Clone, Debug)]
pub struct Background {
    /// Keyword, as written (`Background`, `Context`, ...).
    pub keyword: String,

    /// Line of the keyword.
    pub line: usize,

    /// Steps in declaration order.
    pub steps: Vec<Node<Step>>,
}

/// Static scenario node: either a plain [`Scenario`] or an [`Outline`].
#[derive(Clone, Debug)]
pub enum ScenarioNode {
    /// Plain scenario.
    Scenario(Scenario),

    /// Scenario outline with its example tables.
    Outline(Outline),
}

impl ScenarioNode {
    /// Returns the part common to plain scenarios and outlines.
    #[must_use]
    pub const fn definition(&self) -> &Scenario {
        match self {
            Self::Scenario(sc) => sc,
            Self::Outline(o) => &o.scenario,
        }
    }

    /// Returns the [`Outline`], if this node is one.
    #[must_use]
    pub const fn as_outline(&self) -> Option<&Outline> {
        match self {
            Self::Outline(o) => Some(o),
            Self::Scenario(_) => None,
        }
    }

    /// Indicates whether this node is an [`Outline`].
    #[must_use]
    pub const fn is_outline(&self) -> bool {
        matches!(self, Self::Outline(_))
    }
}

/// Plain scenario (or the template part of an [`Outline`]).
#[derive(Clone, Debug)]
pub struct Scenario {
    /// Keyword, as written (`Scenario`, `Example`, `Scenario Outline`, ...).
    pub keyword: String,

    /// Scenario name.
    pub name: String,

    /// Line of the keyword.
    pub line: usize,

    /// Scenario tags, each starting with `@`.
    pub tags: Vec<String>,

    /// Steps in declaration order.
    pub steps: Vec<Node<Step>>,
}

/// Scenario outline.
#[derive(Clone, Debug)]
pub struct Outline {
    /// Template of the scenario.
    pub scenario: Scenario,

    /// Example blocks in declaration order.
    pub examples: Vec<Examples>,
}

impl Outline {
    /// Iterates over the lines of all the example rows, across all the
    /// [`Examples`] blocks in declaration order.
    pub fn row_lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.examples
            .iter()
            .flat_map(|ex| ex.rows.iter().map(|r| r.line))
    }
}

/// `Examples` block of an [`Outline`].
#[derive(Clone, Debug)]
pub struct Examples {
    /// Line of the keyword.
    pub line: usize,

    /// Header row cells.
    pub header: Vec<String>,

    /// Body rows, without the header.
    pub rows: Vec<Row>,
}

/// Body row of an [`Examples`] table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    /// Line the row is written on.
    pub line: usize,

    /// Cell values.
    pub cells: Vec<String>,
}

/// Step of a [`Background`] or a [`Scenario`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Keyword, as written, including its trailing space (`"Given "`).
    pub keyword: String,

    /// Step text, possibly containing `<placeholder>`s.
    pub text: String,

    /// Line of the keyword.
    pub line: usize,

    /// Multiline argument, if any.
    pub argument: Option<Argument>,
}

/// Multiline argument of a [`Step`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Argument {
    /// Data table, as rows of cells.
    DataTable(Vec<Vec<String>>),

    /// Doc string content.
    DocString(String),
}
