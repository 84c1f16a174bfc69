use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};
use tokio::sync::watch;

use crate::message::model::Upload;
use crate::state::AppState;
use crate::thread::{self, model::NewGroup, model::select_default};
use crate::user;

use super::sequence::Sequences;
use super::state::DrawerState;
use super::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// Blank body and no files, nothing was sent.
    Empty,
    /// Another send is still outstanding.
    Busy,
    NoActiveThread,
}

/// Who asked for a refresh. Failures of user actions end up in
/// [`DrawerState::error`], background failures are only logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    User,
    Poll,
}

/// Client-side controller of the messaging drawer.
///
/// Holds a read-through view of the viewer's threads, the user directory, the
/// unread total and the active thread's messages. Responses are applied in
/// request issue order; a response overtaken by a later request of the same
/// kind is dropped.
#[derive(Clone)]
pub struct Drawer {
    app: AppState,
    state: Arc<watch::Sender<DrawerState>>,
    seq: Arc<Sequences>,
    /// User-triggered loads in flight; `loading` holds while any is.
    loads: Arc<AtomicUsize>,
}

impl Drawer {
    pub fn new(app: AppState, viewer: Option<user::Id>) -> Self {
        let (tx, _) = watch::channel(DrawerState {
            viewer,
            ..Default::default()
        });

        Self {
            app,
            state: Arc::new(tx),
            seq: Arc::new(Sequences::default()),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn snapshot(&self) -> DrawerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DrawerState> {
        self.state.subscribe()
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    pub fn active_thread(&self) -> Option<thread::Id> {
        self.state.borrow().active_thread
    }
}

// visibility and selection
impl Drawer {
    pub async fn open(&self) -> Result<()> {
        self.state.send_if_modified(|s| !std::mem::replace(&mut s.open, true));

        let (threads, ()) = tokio::join!(self.refresh_threads(Trigger::User), self.refresh_users());
        let messages = match self.active_thread() {
            Some(id) => self.show(id, Trigger::User).await,
            None => Ok(()),
        };

        threads.map(|_| ()).and(messages)
    }

    pub fn close(&self) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.open, false));
    }

    pub async fn toggle(&self) -> Result<()> {
        if self.is_open() {
            self.close();
            Ok(())
        } else {
            self.open().await
        }
    }

    pub async fn select(&self, id: thread::Id) -> Result<()> {
        self.state.send_if_modified(|s| s.set_active(Some(id)));

        if self.is_open() {
            self.show(id, Trigger::User).await
        } else {
            Ok(())
        }
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }
}

// thread management
impl Drawer {
    pub async fn create_direct(&self, user_id: user::Id) -> Result<thread::Id> {
        let created = self.app.thread_service.create_direct(&user_id).await;
        let thread = created.map_err(|e| self.fail(Trigger::User, e.into()))?;

        self.state.send_modify(|s| {
            s.set_active(Some(thread.id));
            s.direct_target = None;
        });

        self.after_create(thread.id).await?;
        Ok(thread.id)
    }

    /// Opens a direct thread with the pending target, if one is set.
    pub async fn create_direct_from_target(&self) -> Result<Option<thread::Id>> {
        let target = self.state.borrow().direct_target;

        match target {
            Some(user_id) => self.create_direct(user_id).await.map(Some),
            None => Ok(None),
        }
    }

    /// A blank name or an empty member set is a no-op.
    pub async fn create_group(
        &self,
        name: &str,
        members: &BTreeSet<user::Id>,
    ) -> Result<Option<thread::Id>> {
        let group = match NewGroup::new(name, members) {
            Ok(group) => group,
            Err(e) => {
                debug!("group not created: {e}");
                return Ok(None);
            }
        };

        let created = self.app.thread_service.create_group(&group).await;
        let thread = created.map_err(|e| self.fail(Trigger::User, e.into()))?;

        self.state.send_modify(|s| {
            s.set_active(Some(thread.id));
            s.group_draft.clear();
        });

        self.after_create(thread.id).await?;
        Ok(Some(thread.id))
    }

    pub async fn create_group_from_draft(&self) -> Result<Option<thread::Id>> {
        let draft = self.state.borrow().group_draft.clone();
        self.create_group(&draft.name, &draft.members).await
    }

    async fn after_create(&self, id: thread::Id) -> Result<()> {
        let reselected = self.refresh_threads(Trigger::User).await?;

        if self.is_open() {
            self.show(reselected.unwrap_or(id), Trigger::User).await?;
        }

        Ok(())
    }

    /// Removes the viewer from a thread. When it was the active one the
    /// default thread of the remaining list is selected.
    pub async fn leave(&self, id: thread::Id) -> Result<()> {
        let is_global = self
            .state
            .borrow()
            .threads
            .iter()
            .any(|t| t.id == id && t.is_global);
        if is_global {
            return Err(self.fail(Trigger::User, Error::GlobalThread));
        }

        let left = self.app.thread_service.leave(&id).await;
        left.map_err(|e| self.fail(Trigger::User, e.into()))?;

        let ticket = self.seq.threads.issue();
        let fetched = self.app.thread_service.find_all().await;
        let threads = fetched.map_err(|e| self.fail(Trigger::User, e.into()))?;

        let mut reselected = None;
        self.state.send_modify(|s| {
            if self.seq.threads.try_apply(ticket) {
                reselected = s.apply_threads(threads);
            } else {
                s.threads.retain(|t| t.id != id);
            }

            if s.active_thread == Some(id) {
                let next = select_default(&s.threads);
                s.set_active(next);
                reselected = next;
            }
        });

        match reselected {
            Some(next) if self.is_open() => self.show(next, Trigger::User).await,
            _ => Ok(()),
        }
    }
}

// compose
impl Drawer {
    pub fn set_body(&self, body: impl Into<String>) {
        let body = body.into();
        self.state.send_modify(|s| s.draft.body = body);
    }

    pub fn attach(&self, upload: Upload) {
        self.state.send_modify(|s| s.draft.files.push(upload));
    }

    pub fn detach(&self, index: usize) -> Option<Upload> {
        let mut removed = None;
        self.state.send_if_modified(|s| {
            if index < s.draft.files.len() {
                removed = Some(s.draft.files.remove(index));
            }
            removed.is_some()
        });
        removed
    }

    pub fn set_group_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.state.send_modify(|s| s.group_draft.name = name);
    }

    pub fn toggle_group_member(&self, id: user::Id) -> bool {
        let mut selected = false;
        self.state.send_modify(|s| selected = s.group_draft.toggle(id));
        selected
    }

    pub fn set_direct_target(&self, id: Option<user::Id>) {
        self.state.send_if_modified(|s| std::mem::replace(&mut s.direct_target, id) != id);
    }

    /// Sends the draft to the active thread, then reloads that thread.
    pub async fn send(&self) -> Result<SendOutcome> {
        let mut outcome = SendOutcome::Sent;
        let mut job = None;

        self.state.send_if_modified(|s| {
            let Some(id) = s.active_thread else {
                outcome = SendOutcome::NoActiveThread;
                return false;
            };
            if s.draft.is_empty() {
                outcome = SendOutcome::Empty;
                return false;
            }
            if s.sending {
                outcome = SendOutcome::Busy;
                return false;
            }

            s.sending = true;
            s.error = None;
            job = Some((id, s.draft.body.trim().to_string(), s.draft.files.clone()));
            true
        });

        let Some((id, body, files)) = job else {
            debug!("nothing sent: {outcome:?}");
            return Ok(outcome);
        };

        let sent = self.app.message_service.send(&id, &body, &files).await;
        let result = match sent {
            Ok(_) => {
                self.state.send_modify(|s| s.draft.clear());
                self.show(id, Trigger::User).await
            }
            Err(e) => Err(self.fail(Trigger::User, e.into())),
        };

        self.state.send_modify(|s| s.sending = false);
        result.map(|()| SendOutcome::Sent)
    }
}

// refresh
impl Drawer {
    /// One tick of background polling. The unread total is always refreshed;
    /// threads, users and the active thread only while the drawer is open.
    pub async fn poll_tick(&self) {
        if !self.is_open() {
            self.refresh_unread().await;
            return;
        }

        let active = self.active_thread();
        let threads = async {
            if let Ok(Some(next)) = self.refresh_threads(Trigger::Poll).await {
                let _ = self.show(next, Trigger::Poll).await;
            }
        };
        let messages = async {
            if let Some(id) = active {
                let _ = self.show(id, Trigger::Poll).await;
            }
        };

        tokio::join!(self.refresh_unread(), threads, self.refresh_users(), messages);
    }

    /// Best effort, failures are only logged.
    pub async fn refresh_unread(&self) {
        let ticket = self.seq.unread.issue();

        match self.app.thread_service.unread_count().await {
            Ok(count) => {
                self.state.send_if_modified(|s| {
                    if !self.seq.unread.try_apply(ticket) {
                        return false;
                    }
                    std::mem::replace(&mut s.unread_count, count) != count
                });
            }
            Err(e) => debug!("could not refresh unread count: {e}"),
        }
    }

    /// Best effort, failures are only logged.
    pub async fn refresh_users(&self) {
        let ticket = self.seq.users.issue();

        match self.app.user_service.find_all().await {
            Ok(users) => {
                self.state.send_if_modified(|s| {
                    if !self.seq.users.try_apply(ticket) {
                        return false;
                    }
                    s.users = users;
                    true
                });
            }
            Err(e) => debug!("could not refresh users: {e}"),
        }
    }

    async fn refresh_threads(&self, trigger: Trigger) -> Result<Option<thread::Id>> {
        self.fetch_threads()
            .await
            .map_err(|e| self.fail(trigger, e))
    }

    async fn fetch_threads(&self) -> Result<Option<thread::Id>> {
        let ticket = self.seq.threads.issue();
        let threads = self.app.thread_service.find_all().await?;

        let mut reselected = None;
        self.state.send_if_modified(|s| {
            if !self.seq.threads.try_apply(ticket) {
                debug!("dropping outdated thread list");
                return false;
            }
            reselected = s.apply_threads(threads);
            true
        });

        Ok(reselected)
    }

    /// Loads a thread and, when that moved the selection elsewhere, the newly
    /// selected thread once.
    async fn show(&self, id: thread::Id, trigger: Trigger) -> Result<()> {
        if let Some(next) = self.load_messages(id, trigger).await? {
            self.load_messages(next, trigger).await?;
        }
        Ok(())
    }

    /// fetch messages -> mark read -> refetch threads and unread total.
    async fn load_messages(&self, id: thread::Id, trigger: Trigger) -> Result<Option<thread::Id>> {
        if trigger == Trigger::User {
            self.state.send_modify(|s| {
                self.loads.fetch_add(1, Ordering::SeqCst);
                s.loading = true;
                s.error = None;
            });
        }

        let result = self.sync_thread(id).await;

        if trigger == Trigger::User {
            self.state.send_modify(|s| {
                s.loading = self.loads.fetch_sub(1, Ordering::SeqCst) > 1;
            });
        }

        result.map_err(|e| self.fail(trigger, e))
    }

    async fn sync_thread(&self, id: thread::Id) -> Result<Option<thread::Id>> {
        let ticket = self.seq.messages.issue();
        let messages = self.app.message_service.find_by_thread(&id).await?;

        self.state.send_if_modified(|s| {
            if s.active_thread != Some(id) || !self.seq.messages.try_apply(ticket) {
                debug!("dropping outdated messages of thread {id}");
                return false;
            }
            s.messages = messages;
            true
        });

        self.app.thread_service.mark_read(&id).await?;

        let (threads, ()) = tokio::join!(self.fetch_threads(), self.refresh_unread());
        let reselected = threads?;

        Ok(reselected.filter(|_| self.is_open()))
    }

    fn fail(&self, trigger: Trigger, e: Error) -> Error {
        match trigger {
            Trigger::User => {
                let message = e.to_string();
                self.state.send_modify(|s| s.error = Some(message));
            }
            Trigger::Poll => warn!("background refresh failed: {e}"),
        }
        e
    }
}
