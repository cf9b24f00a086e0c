mod auth;
mod error;
mod user_handler;

pub use user_handler::*;

use crate::services::SocialStore;

pub struct ServerState<T: SocialStore> {
    pub store: T,
}
