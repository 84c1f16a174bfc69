use crate::{message, thread, user};

mod controller;
mod poller;
mod sequence;
pub mod state;

pub use controller::{Drawer, SendOutcome};
pub use poller::Poller;
pub use state::{DrawerState, GroupDraft};

type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("the global thread cannot be left")]
    GlobalThread,

    #[error(transparent)]
    _Message(#[from] message::Error),
    #[error(transparent)]
    _Thread(#[from] thread::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
}
