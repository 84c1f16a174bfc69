use std::sync::Arc;

use crate::auth::service::AuthServiceImpl;
use crate::integration::{self, api::ApiClient};
use crate::message::service::MessageServiceImpl;
use crate::thread::service::ThreadServiceImpl;
use crate::user::service::UserServiceImpl;
use crate::{auth, message, thread, user};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: auth::Service,
    pub user_service: user::Service,
    pub thread_service: thread::Service,
    pub message_service: message::Service,
}

impl AppState {
    pub fn new(
        auth_service: auth::Service,
        user_service: user::Service,
        thread_service: thread::Service,
        message_service: message::Service,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            thread_service,
            message_service,
        }
    }

    pub fn init(config: &integration::api::Config) -> crate::Result<Self> {
        let api = ApiClient::init(config)?;

        Ok(Self::new(
            Arc::new(AuthServiceImpl::new(api.clone())),
            Arc::new(UserServiceImpl::new(api.clone())),
            Arc::new(ThreadServiceImpl::new(api.clone())),
            Arc::new(MessageServiceImpl::new(api)),
        ))
    }
}
