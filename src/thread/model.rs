use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::user::{self, model::Participant, model::User};

use super::{Id, Kind};

const FALLBACK_TITLE: &str = "Message";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Thread {
    pub id: Id,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub unread_count: u32,
}

impl Thread {
    pub const fn kind(&self) -> Kind {
        if self.is_global {
            Kind::Global
        } else if self.is_group {
            Kind::Group
        } else {
            Kind::Direct
        }
    }

    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(FALLBACK_TITLE)
    }

    pub fn activity_at(&self) -> Option<&DateTime<Utc>> {
        self.last_message_at.as_ref().or(self.updated_at.as_ref())
    }

    pub fn has_participant(&self, id: &user::Id) -> bool {
        self.participants.iter().any(|p| p.user.id.eq(id))
    }

    /// The counterpart of a direct thread: the first participant that is not
    /// the viewer. Group and global threads have none.
    pub fn other_participant(&self, viewer: Option<&user::Id>) -> Option<&User> {
        if self.kind() != Kind::Direct {
            return None;
        }

        let mut others = self
            .participants
            .iter()
            .map(|p| &p.user)
            .filter(|u| Some(&u.id) != viewer);

        let first = others.next();
        if first.is_some() && others.next().is_some() {
            warn!("direct thread {} has more than one other participant", self.id);
        }

        first
    }
}

/// Global thread if any, otherwise the first thread, otherwise none.
pub fn select_default(threads: &[Thread]) -> Option<Id> {
    threads
        .iter()
        .find(|t| t.is_global)
        .or(threads.first())
        .map(|t| t.id)
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewGroup {
    name: String,
    user_ids: Vec<user::Id>,
}

impl NewGroup {
    pub fn new(name: &str, members: &BTreeSet<user::Id>) -> super::Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(super::Error::MissingName);
        }

        if members.is_empty() {
            return Err(super::Error::NoMembers);
        }

        Ok(Self {
            name: name.to_string(),
            user_ids: members.iter().copied().collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_ids(&self) -> &[user::Id] {
        &self.user_ids
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Default)]
pub struct UnreadCount {
    #[serde(default)]
    pub unread_count: u32,
}

#[cfg(test)]
mod test {
    use super::*;

    fn thread(id: i64, is_group: bool, is_global: bool) -> Thread {
        Thread {
            id: Id::from(id),
            is_group,
            is_global,
            name: None,
            title: None,
            participants: vec![],
            last_message_at: None,
            updated_at: None,
            unread_count: 0,
        }
    }

    fn participant(id: i64, username: &str) -> Participant {
        User::new(user::Id::from(id), username, false).into()
    }

    #[test]
    fn should_select_global_thread_first() {
        let threads = vec![thread(1, false, false), thread(2, true, false), thread(3, true, true)];

        assert_eq!(select_default(&threads), Some(Id::from(3)));
    }

    #[test]
    fn should_select_first_thread_without_global() {
        let threads = vec![thread(5, true, false), thread(6, false, false)];

        assert_eq!(select_default(&threads), Some(Id::from(5)));
    }

    #[test]
    fn should_select_nothing_from_empty_list() {
        assert_eq!(select_default(&[]), None);
    }

    #[test]
    fn should_resolve_other_participant_of_direct_thread() {
        let mut t = thread(1, false, false);
        t.participants = vec![participant(1, "mehmet"), participant(7, "ayse")];

        let other = t.other_participant(Some(&user::Id::from(1))).unwrap();

        assert_eq!(other.username, "ayse");
    }

    #[test]
    fn should_take_first_participant_when_viewer_unknown() {
        let mut t = thread(1, false, false);
        t.participants = vec![participant(1, "mehmet"), participant(7, "ayse")];

        let other = t.other_participant(None).unwrap();

        assert_eq!(other.username, "mehmet");
    }

    #[test]
    fn should_not_resolve_other_participant_of_group() {
        let mut t = thread(1, true, false);
        t.participants = vec![participant(1, "mehmet"), participant(7, "ayse")];

        assert!(t.other_participant(Some(&user::Id::from(1))).is_none());
    }

    #[test]
    fn should_not_resolve_other_participant_when_alone() {
        let mut t = thread(1, false, false);
        t.participants = vec![participant(1, "mehmet")];

        assert!(t.other_participant(Some(&user::Id::from(1))).is_none());
    }

    #[test]
    fn should_prefer_title_over_name() {
        let mut t = thread(1, true, false);
        assert_eq!(t.display_name(), "Message");

        t.name = Some("Muhasebe".into());
        assert_eq!(t.display_name(), "Muhasebe");

        t.title = Some("Muhasebe Ekibi".into());
        assert_eq!(t.display_name(), "Muhasebe Ekibi");
    }

    #[test]
    fn should_classify_kind() {
        assert_eq!(thread(1, true, true).kind(), Kind::Global);
        assert_eq!(thread(1, true, false).kind(), Kind::Group);
        assert_eq!(thread(1, false, false).kind(), Kind::Direct);
        assert_eq!(thread(1, false, false).kind().as_str(), "direct");
        assert_eq!(thread(1, true, true).kind().as_str(), "global");
    }

    #[test]
    fn should_deserialize_server_thread() {
        let json = r#"{
            "id": 12,
            "is_group": false,
            "is_global": false,
            "name": null,
            "title": "Ayse",
            "participants": [{"user": {"id": 7, "username": "ayse", "is_online": true}}],
            "last_message_at": "2026-03-01T09:30:00Z",
            "updated_at": "2026-03-01T09:00:00Z",
            "unread_count": 2
        }"#;

        let t: Thread = serde_json::from_str(json).unwrap();

        assert_eq!(t.id, Id::from(12));
        assert_eq!(t.unread_count, 2);
        assert!(t.has_participant(&user::Id::from(7)));
        assert_eq!(
            t.activity_at().map(|at| at.to_rfc3339()),
            Some("2026-03-01T09:30:00+00:00".to_string())
        );
    }

    #[test]
    fn should_reject_blank_group_name() {
        let members = BTreeSet::from([user::Id::from(3)]);

        let result = NewGroup::new("   ", &members);

        assert!(matches!(result, Err(crate::thread::Error::MissingName)));
    }

    #[test]
    fn should_reject_group_without_members() {
        let result = NewGroup::new("Muhasebe", &BTreeSet::new());

        assert!(matches!(result, Err(crate::thread::Error::NoMembers)));
    }

    #[test]
    fn should_trim_group_name() {
        let members = BTreeSet::from([user::Id::from(5), user::Id::from(3)]);

        let group = NewGroup::new("  Muhasebe ", &members).unwrap();

        assert_eq!(group.name(), "Muhasebe");
        assert_eq!(group.user_ids(), &[user::Id::from(3), user::Id::from(5)]);
    }
}
