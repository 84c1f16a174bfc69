use std::sync::atomic::{AtomicU64, Ordering};

/// Orders responses of one resource by the time their request was issued.
#[derive(Default)]
pub(super) struct Sequence {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl Sequence {
    pub fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True when nothing issued after `ticket` has been applied yet.
    pub fn try_apply(&self, ticket: u64) -> bool {
        self.applied
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |applied| {
                (ticket > applied).then_some(ticket)
            })
            .is_ok()
    }
}

#[derive(Default)]
pub(super) struct Sequences {
    pub threads: Sequence,
    pub users: Sequence,
    pub unread: Sequence,
    pub messages: Sequence,
}
