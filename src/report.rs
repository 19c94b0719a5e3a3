// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`Serialize`]able requests to a [ReportPortal]-like reporting backend.
//!
//! [ReportPortal]: https://reportportal.io

use std::{collections::BTreeSet, time::SystemTime};

use derive_more::with_trait::{AsRef, Display, From, Into};
use serde::Serialize;

use crate::event::{HookType, Status};

/// Identifier of a test item, assigned by the reporting backend.
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq, Serialize,
)]
#[as_ref(forward)]
#[serde(transparent)]
pub struct ItemId(String);

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Attribute of a test item.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Attribute {
    /// Optional key of this [`Attribute`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Value of this [`Attribute`].
    pub value: String,
}

impl Attribute {
    /// Creates a key-less [`Attribute`] out of the given `value`.
    #[must_use]
    pub fn value(value: impl Into<String>) -> Self {
        Self { key: None, value: value.into() }
    }
}

/// Converts `tags` into deduplicated key-less [`Attribute`]s.
#[must_use]
pub fn attributes<S: AsRef<str>>(tags: &[S]) -> BTreeSet<Attribute> {
    tags.iter()
        .map(|t| -> &str { t.as_ref() })
        .map(Attribute::value)
        .collect()
}

/// Named parameter of a step.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Parameter {
    /// Name of the placeholder.
    pub key: String,

    /// Runtime value of the placeholder.
    pub value: String,
}

/// Type of a test item.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    /// Feature.
    #[display("STORY")]
    Story,

    /// Scenario.
    #[display("SCENARIO")]
    Scenario,

    /// Step.
    #[display("STEP")]
    Step,

    /// [`HookType::Before`].
    #[display("BEFORE_TEST")]
    BeforeTest,

    /// [`HookType::After`].
    #[display("AFTER_TEST")]
    AfterTest,

    /// [`HookType::BeforeStep`].
    #[display("BEFORE_METHOD")]
    BeforeMethod,

    /// [`HookType::AfterStep`].
    #[display("AFTER_METHOD")]
    AfterMethod,
}

impl ItemType {
    /// Returns the [`ItemType`] and the item name of a [`HookType`].
    #[must_use]
    pub const fn of_hook(hook: HookType) -> (Self, &'static str) {
        match hook {
            HookType::Before => (Self::BeforeTest, "Before hooks"),
            HookType::After => (Self::AfterTest, "After hooks"),
            HookType::BeforeStep => (Self::BeforeMethod, "Before step"),
            HookType::AfterStep => (Self::AfterMethod, "After step"),
        }
    }
}

/// Status a test item is finished with.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// Item passed.
    #[display("PASSED")]
    Passed,

    /// Item failed.
    #[display("FAILED")]
    Failed,

    /// Item was skipped, or its outcome has no direct counterpart.
    #[display("SKIPPED")]
    Skipped,
}

impl From<Status> for ItemStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Passed => Self::Passed,
            Status::Failed => Self::Failed,
            Status::Skipped
            | Status::Pending
            | Status::Ambiguous
            | Status::Undefined
            | Status::Unused => Self::Skipped,
        }
    }
}

/// Level of a [`LogEntry`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Informational message.
    #[display("INFO")]
    Info,

    /// Warning.
    #[display("WARN")]
    Warn,

    /// Error.
    #[display("ERROR")]
    Error,
}

impl From<Status> for LogLevel {
    fn from(status: Status) -> Self {
        match status {
            Status::Passed => Self::Info,
            Status::Skipped => Self::Warn,
            Status::Failed
            | Status::Pending
            | Status::Ambiguous
            | Status::Undefined
            | Status::Unused => Self::Error,
        }
    }
}

/// Request to start a test item.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartItem {
    /// Name of the item.
    pub name: String,

    /// Description of the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Reference to the code defining the item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_ref: Option<String>,

    /// Stable test case identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_case_id: Option<String>,

    /// Attributes of the item.
    pub attributes: BTreeSet<Attribute>,

    /// Named parameters of the item.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    /// Type of the item.
    #[serde(rename = "type")]
    pub item_type: ItemType,

    /// Whether the item counts in statistics.
    pub has_stats: bool,

    /// Time the item started at.
    pub start_time: SystemTime,
}

impl StartItem {
    /// Creates a new [`StartItem`] of the given `name` and type, starting now.
    #[must_use]
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            description: None,
            code_ref: None,
            test_case_id: None,
            attributes: BTreeSet::new(),
            parameters: vec![],
            item_type,
            has_stats: true,
            start_time: SystemTime::now(),
        }
    }
}

/// Request to finish a test item.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishItem {
    /// Time the item finished at.
    pub end_time: SystemTime,

    /// Status of the item, if it's not derived by the backend from its
    /// children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

impl FinishItem {
    /// Creates a new [`FinishItem`] finishing now with the given `status`.
    #[must_use]
    pub fn new(status: Option<ItemStatus>) -> Self {
        Self { end_time: SystemTime::now(), status }
    }
}

/// Log message attached to a test item.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Level of the message.
    pub level: LogLevel,

    /// The message itself.
    pub message: String,

    /// Time the message was emitted at.
    pub time: SystemTime,
}

impl LogEntry {
    /// Creates a new [`LogEntry`] emitted now.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self { level, message: message.into(), time: SystemTime::now() }
    }
}
