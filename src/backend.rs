// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reporting backends receiving test items.

use async_trait::async_trait;
use linked_hash_map::LinkedHashMap;
use tracing::warn;

use crate::report::{FinishItem, ItemId, LogEntry, StartItem};

/// Backend of a [ReportPortal]-like service, storing a hierarchy of test
/// items.
///
/// Transport, batching and authentication are left to implementors.
///
/// [ReportPortal]: https://reportportal.io
#[async_trait(?Send)]
pub trait Backend {
    /// Starts a new test item under the `parent` one (or a root item if
    /// there is no `parent`), returning the identifier assigned to it.
    async fn start_item(
        &mut self,
        parent: Option<&ItemId>,
        item: StartItem,
    ) -> ItemId;

    /// Finishes the test item with the given `id`.
    async fn finish_item(&mut self, id: &ItemId, item: FinishItem);

    /// Attaches a log `entry` to the test item with the given `id`.
    ///
    /// Drops the `entry` by default.
    async fn log(&mut self, id: &ItemId, entry: LogEntry) {
        _ = (id, entry);
    }
}

/// Test item recorded by the [`Memory`] backend.
#[derive(Clone, Debug)]
pub struct Item {
    /// Identifier assigned to this [`Item`].
    pub id: ItemId,

    /// Identifier of the parent [`Item`], if any.
    pub parent: Option<ItemId>,

    /// Request this [`Item`] was started with.
    pub start: StartItem,

    /// Request this [`Item`] was finished with, if it's finished.
    pub finish: Option<FinishItem>,

    /// Log entries attached to this [`Item`].
    pub logs: Vec<LogEntry>,
}

/// [`Backend`] recording test items in memory, in the order they were
/// started.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Recorded items.
    items: LinkedHashMap<ItemId, Item>,
}

impl Memory {
    /// Creates a new empty [`Memory`] backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over all the recorded [`Item`]s in the order they were
    /// started.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Returns the recorded [`Item`] with the given `id`, if any.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Iterates over the [`Item`]s started directly under the `parent` one,
    /// or over the root [`Item`]s if there is no `parent`.
    pub fn children<'me>(
        &'me self,
        parent: Option<&'me ItemId>,
    ) -> impl Iterator<Item = &'me Item> + 'me {
        self.items.values().filter(move |i| i.parent.as_ref() == parent)
    }

    /// Returns the number of recorded [`Item`]s.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Indicates whether no [`Item`]s are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait(?Send)]
impl Backend for Memory {
    async fn start_item(
        &mut self,
        parent: Option<&ItemId>,
        item: StartItem,
    ) -> ItemId {
        let id = ItemId::from(format!("item-{}", self.items.len() + 1));
        _ = self.items.insert(
            id.clone(),
            Item {
                id: id.clone(),
                parent: parent.cloned(),
                start: item,
                finish: None,
                logs: vec![],
            },
        );
        id
    }

    async fn finish_item(&mut self, id: &ItemId, item: FinishItem) {
        match self.items.get_mut(id) {
            Some(i) if i.finish.is_none() => i.finish = Some(item),
            Some(_) => warn!(%id, "item is finished already"),
            None => warn!(%id, "finishing unknown item"),
        }
    }

    async fn log(&mut self, id: &ItemId, entry: LogEntry) {
        if let Some(i) = self.items.get_mut(id) {
            i.logs.push(entry);
        } else {
            warn!(%id, "logging to unknown item");
        }
    }
}
