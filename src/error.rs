use crate::{auth, drawer, integration, message, thread, user};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("viewer is not authenticated")]
    Unauthenticated,

    #[error(transparent)]
    _Auth(#[from] auth::Error),
    #[error(transparent)]
    _Drawer(#[from] drawer::Error),
    #[error(transparent)]
    _Integration(#[from] integration::Error),
    #[error(transparent)]
    _Message(#[from] message::Error),
    #[error(transparent)]
    _Thread(#[from] thread::Error),
    #[error(transparent)]
    _User(#[from] user::Error),
}
