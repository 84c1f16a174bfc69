#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use ymm_messenger::auth::service::AuthService;
use ymm_messenger::auth::{self, Credentials, Token, Tokens, Viewer};
use ymm_messenger::integration;
use ymm_messenger::message::service::MessageService;
use ymm_messenger::message::{self, model::Message, model::Upload};
use ymm_messenger::state::AppState;
use ymm_messenger::thread::model::{NewGroup, Thread};
use ymm_messenger::thread::service::ThreadService;
use ymm_messenger::user::model::{Participant, User};
use ymm_messenger::user::service::UserService;
use ymm_messenger::{thread, user};

pub const MEHMET: i64 = 1;
pub const AYSE: i64 = 7;

pub const FAILURE: &str = "sunucu hatasi";

/// Requests the fake backend received, in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Threads,
    Users,
    Unread,
    Messages(thread::Id),
    MarkRead(thread::Id),
    Send {
        thread: thread::Id,
        body: String,
        files: usize,
    },
    Direct(user::Id),
    Group {
        name: String,
        members: Vec<user::Id>,
    },
    Leave(thread::Id),
}

/// In-memory chat backend behind every service trait.
#[derive(Default)]
pub struct Backend {
    calls: Mutex<Vec<Call>>,
    threads: Mutex<Vec<Thread>>,
    scripted_threads: Mutex<VecDeque<(Duration, Vec<Thread>)>>,
    users: Mutex<Vec<User>>,
    messages: Mutex<HashMap<thread::Id, Vec<Message>>>,
    message_delays: Mutex<HashMap<thread::Id, Duration>>,
    send_delay: Mutex<Duration>,
    unread: Mutex<u32>,
    failing: Mutex<HashSet<&'static str>>,
    next_id: Mutex<i64>,
}

impl Backend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        *backend.next_id.lock().unwrap() = 100;
        Arc::new(backend)
    }

    /// Global, "Team A" and a direct thread with Ayşe; Ayşe is online.
    pub fn seeded() -> Arc<Self> {
        let backend = Self::new();
        backend.set_threads(vec![
            global(1),
            group(2, "Team A", &[MEHMET, 3]),
            direct(3, MEHMET, AYSE),
        ]);
        backend.set_users(vec![
            User::new(user::Id::from(MEHMET), "mehmet", true),
            User::new(user::Id::from(3), "ali", false),
            User::new(user::Id::from(5), "zeynep", false),
            User::new(user::Id::from(AYSE), "ayse", true),
        ]);
        backend
    }

    pub fn app(self: &Arc<Self>) -> AppState {
        AppState::new(self.clone(), self.clone(), self.clone(), self.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn set_threads(&self, threads: Vec<Thread>) {
        *self.threads.lock().unwrap() = threads;
    }

    /// The next thread list request answers `threads` after `delay`,
    /// regardless of the stored list.
    pub fn script_threads(&self, delay: Duration, threads: Vec<Thread>) {
        self.scripted_threads
            .lock()
            .unwrap()
            .push_back((delay, threads));
    }

    pub fn set_users(&self, users: Vec<User>) {
        *self.users.lock().unwrap() = users;
    }

    pub fn set_messages(&self, id: i64, messages: Vec<Message>) {
        self.messages
            .lock()
            .unwrap()
            .insert(thread::Id::from(id), messages);
    }

    pub fn delay_messages(&self, id: i64, delay: Duration) {
        self.message_delays
            .lock()
            .unwrap()
            .insert(thread::Id::from(id), delay);
    }

    pub fn delay_send(&self, delay: Duration) {
        *self.send_delay.lock().unwrap() = delay;
    }

    pub fn set_unread(&self, count: u32) {
        *self.unread.lock().unwrap() = count;
    }

    /// Makes the named operation answer with a server error.
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &'static str) -> Result<(), integration::Error> {
        if self.failing.lock().unwrap().contains(op) {
            return Err(integration::Error::Status {
                status: 500,
                message: FAILURE.into(),
            });
        }
        Ok(())
    }

    fn next_id(&self) -> i64 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl AuthService for Backend {
    async fn login(&self, _credentials: &Credentials) -> Result<Tokens, auth::Error> {
        Ok(Tokens {
            access: Token::new("access-token-for-tests"),
            refresh: Token::new("refresh-token-for-tests"),
        })
    }

    async fn refresh(&self) -> Result<Token, auth::Error> {
        Ok(Token::new("refreshed-access-token"))
    }

    async fn me(&self) -> Result<Option<Viewer>, auth::Error> {
        Ok(Some(Viewer::new(Some(user::Id::from(MEHMET)), "mehmet", false)))
    }
}

#[async_trait]
impl UserService for Backend {
    async fn find_all(&self) -> Result<Vec<User>, user::Error> {
        self.record(Call::Users);
        self.check("users")?;
        Ok(self.users.lock().unwrap().clone())
    }
}

#[async_trait]
impl ThreadService for Backend {
    async fn find_all(&self) -> Result<Vec<Thread>, thread::Error> {
        self.record(Call::Threads);
        self.check("threads")?;

        let scripted = self.scripted_threads.lock().unwrap().pop_front();
        let Some((delay, threads)) = scripted else {
            let threads = self.threads.lock().unwrap().clone();
            return Ok(threads);
        };

        pause(delay).await;
        Ok(threads)
    }

    async fn create_direct(&self, user_id: &user::Id) -> Result<Thread, thread::Error> {
        self.record(Call::Direct(*user_id));
        self.check("direct")?;

        let created = direct(self.next_id(), MEHMET, user_id.get());
        self.threads.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Thread, thread::Error> {
        self.record(Call::Group {
            name: group.name().to_string(),
            members: group.user_ids().to_vec(),
        });
        self.check("group")?;

        let ids = group.user_ids().iter().map(|id| id.get()).collect::<Vec<_>>();
        let created = self::group(self.next_id(), group.name(), &ids);
        self.threads.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn leave(&self, id: &thread::Id) -> Result<(), thread::Error> {
        self.record(Call::Leave(*id));
        self.check("leave")?;

        self.threads.lock().unwrap().retain(|t| t.id != *id);
        Ok(())
    }

    async fn mark_read(&self, id: &thread::Id) -> Result<(), thread::Error> {
        self.record(Call::MarkRead(*id));
        self.check("read")?;
        Ok(())
    }

    async fn unread_count(&self) -> Result<u32, thread::Error> {
        self.record(Call::Unread);
        self.check("unread")?;
        Ok(*self.unread.lock().unwrap())
    }
}

#[async_trait]
impl MessageService for Backend {
    async fn find_by_thread(&self, thread_id: &thread::Id) -> Result<Vec<Message>, message::Error> {
        self.record(Call::Messages(*thread_id));
        self.check("messages")?;

        let delay = self
            .message_delays
            .lock()
            .unwrap()
            .get(thread_id)
            .copied()
            .unwrap_or_default();
        pause(delay).await;

        let messages = self.messages.lock().unwrap().get(thread_id).cloned();
        Ok(messages.unwrap_or_default())
    }

    async fn send(
        &self,
        thread_id: &thread::Id,
        body: &str,
        files: &[Upload],
    ) -> Result<Message, message::Error> {
        self.record(Call::Send {
            thread: *thread_id,
            body: body.to_string(),
            files: files.len(),
        });

        let delay = *self.send_delay.lock().unwrap();
        pause(delay).await;
        self.check("send")?;

        let sent = message(self.next_id(), MEHMET, body);
        self.messages
            .lock()
            .unwrap()
            .entry(*thread_id)
            .or_default()
            .push(sent.clone());
        Ok(sent)
    }
}

pub fn global(id: i64) -> Thread {
    Thread {
        id: thread::Id::from(id),
        is_group: true,
        is_global: true,
        name: Some("Genel".into()),
        title: None,
        participants: vec![],
        last_message_at: None,
        updated_at: None,
        unread_count: 0,
    }
}

pub fn group(id: i64, name: &str, members: &[i64]) -> Thread {
    Thread {
        id: thread::Id::from(id),
        is_group: true,
        is_global: false,
        name: Some(name.into()),
        title: None,
        participants: members.iter().map(|m| participant(*m)).collect(),
        last_message_at: None,
        updated_at: None,
        unread_count: 0,
    }
}

pub fn direct(id: i64, viewer: i64, other: i64) -> Thread {
    Thread {
        id: thread::Id::from(id),
        is_group: false,
        is_global: false,
        name: None,
        title: None,
        participants: vec![participant(viewer), participant(other)],
        last_message_at: None,
        updated_at: None,
        unread_count: 0,
    }
}

pub fn message(id: i64, sender: i64, body: &str) -> Message {
    Message {
        id: message::Id::from(id),
        sender: User::new(user::Id::from(sender), format!("user{sender}"), true),
        body: Some(body.into()),
        created_at: Utc::now(),
        files: vec![],
    }
}

fn participant(id: i64) -> Participant {
    User::new(user::Id::from(id), format!("user{id}"), false).into()
}
