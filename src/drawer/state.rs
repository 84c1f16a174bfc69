use std::collections::BTreeSet;

use crate::message::model::{Draft, Message};
use crate::thread::{self, model::Thread, model::select_default};
use crate::user::{self, model::User};

/// Snapshot of everything the messaging drawer shows.
#[derive(Clone, Debug, Default)]
pub struct DrawerState {
    pub open: bool,
    pub threads: Vec<Thread>,
    pub users: Vec<User>,
    pub active_thread: Option<thread::Id>,
    /// Messages of `active_thread`.
    pub messages: Vec<Message>,
    pub unread_count: u32,
    pub draft: Draft,
    pub group_draft: GroupDraft,
    pub direct_target: Option<user::Id>,
    pub loading: bool,
    pub sending: bool,
    pub error: Option<String>,
    pub viewer: Option<user::Id>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupDraft {
    pub name: String,
    pub members: BTreeSet<user::Id>,
}

impl GroupDraft {
    /// Adds the member when absent, removes it otherwise. Returns whether it
    /// is selected afterwards.
    pub fn toggle(&mut self, id: user::Id) -> bool {
        if self.members.remove(&id) {
            false
        } else {
            self.members.insert(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.members.clear();
    }
}

impl DrawerState {
    pub fn active(&self) -> Option<&Thread> {
        let id = self.active_thread?;
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn is_online(&self, id: &user::Id) -> bool {
        self.users.iter().any(|u| u.id.eq(id) && u.is_online)
    }

    pub fn other_participant<'a>(&'a self, t: &'a Thread) -> Option<&'a User> {
        t.other_participant(self.viewer.as_ref())
    }

    /// Online dot of a direct thread's counterpart, from the user directory.
    pub fn is_counterpart_online(&self, t: &Thread) -> bool {
        self.other_participant(t)
            .is_some_and(|u| self.is_online(&u.id))
    }

    pub(super) fn set_active(&mut self, id: Option<thread::Id>) -> bool {
        if self.active_thread == id {
            return false;
        }

        self.active_thread = id;
        self.messages.clear();
        true
    }

    /// Replaces the thread list. When the active thread is gone from it the
    /// default thread is selected; that new selection is returned.
    pub(super) fn apply_threads(&mut self, threads: Vec<Thread>) -> Option<thread::Id> {
        self.threads = threads;

        let still_listed = self
            .active_thread
            .is_some_and(|id| self.threads.iter().any(|t| t.id == id));
        if still_listed {
            return None;
        }

        let next = select_default(&self.threads);
        if self.set_active(next) { next } else { None }
    }
}
