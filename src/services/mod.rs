pub mod social_service;
#[cfg(test)]
pub mod memory_store;

pub use social_service::{
    connection_counterparts, feed_exclusion_set, MongoSocialService, SocialStore,
};
