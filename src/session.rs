//! Session state for the interactive board.
//!
//! This module contains the `Session` struct, which bundles the task store
//! with the list settings, the bulk selection and the current navigation
//! view. Everything the shell mutates lives here and is passed explicitly.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::action::Action;
use crate::draft::{DraftError, TaskDraft};
use crate::fields::{FilterBy, NavView};
use crate::store::{Dispatched, TaskStore};
use crate::task::Task;
use crate::transfer::{self, TransferError};
use crate::view::{project, Selection, Stats, ViewState};

/// Main state of one board session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    store: TaskStore,
    pub view: ViewState,
    pub selection: Selection,
    nav: NavView,
}

impl Session {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn nav(&self) -> NavView {
        self.nav
    }

    /// Apply an action to the store. Selected ids that no longer exist are
    /// dropped from the selection.
    pub fn dispatch(&mut self, action: Action, now: DateTime<Utc>) -> Dispatched {
        let out = self.store.dispatch(action, now);
        self.selection.retain_existing(self.store.tasks());
        out
    }

    /// Validate a draft and add it. Returns the new task's id.
    pub fn add(
        &mut self,
        draft: TaskDraft,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<u64, DraftError> {
        let action = draft.into_add_action(today)?;
        Ok(self.dispatch(action, now).added.unwrap_or_default())
    }

    /// Validate a draft and write it over task `id`.
    pub fn edit(
        &mut self,
        id: u64,
        draft: TaskDraft,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<Dispatched, DraftError> {
        let action = draft.into_update_action(id, today)?;
        Ok(self.dispatch(action, now))
    }

    /// Delete every selected task and clear the selection. `None` when the
    /// selection was empty.
    pub fn bulk_delete(&mut self, now: DateTime<Utc>) -> Option<Dispatched> {
        let action = self.selection.bulk_delete()?;
        let out = self.dispatch(action, now);
        self.selection.clear();
        Some(out)
    }

    /// Complete every selected task and clear the selection. `None` when the
    /// selection was empty.
    pub fn bulk_complete(&mut self, now: DateTime<Utc>) -> Option<Dispatched> {
        let action = self.selection.bulk_complete()?;
        let out = self.dispatch(action, now);
        self.selection.clear();
        Some(out)
    }

    /// Switch navigation view, applying its filter presets.
    pub fn navigate(&mut self, to: NavView) {
        match to {
            NavView::Favorites => {
                self.view.filter = FilterBy::Favorites;
                self.view.show_archived = false;
            }
            NavView::Archive => {
                self.view.show_archived = true;
                self.view.filter = FilterBy::All;
            }
            NavView::Stats => {
                self.view.show_archived = false;
            }
            NavView::Dashboard => {
                self.view.show_archived = false;
                self.view.filter = FilterBy::All;
            }
            NavView::Tasks => {
                self.view.show_archived = false;
            }
        }
        self.nav = to;
        info!(view = to.label(), filter = %self.view.filter, "navigated");
    }

    /// Tasks visible under the current view settings.
    pub fn visible(&self, today: NaiveDate) -> Vec<&Task> {
        project(self.store.tasks(), &self.view, today)
    }

    pub fn stats(&self, today: NaiveDate) -> Stats {
        Stats::compute(self.store.tasks(), today)
    }

    /// Select every currently visible task.
    pub fn select_visible(&mut self, today: NaiveDate) {
        let visible = project(self.store.tasks(), &self.view, today);
        self.selection.select_all(&visible);
    }

    pub fn export(&self, path: &Path) -> Result<(), TransferError> {
        transfer::export_to(path, self.store.tasks())
    }

    /// Replace the collection with a file's contents. On error the session
    /// is left untouched.
    pub fn import(&mut self, path: &Path, now: DateTime<Utc>) -> Result<Dispatched, TransferError> {
        let action = transfer::load_action(path)?;
        let out = self.dispatch(action, now);
        self.selection.clear();
        Ok(out)
    }
}
