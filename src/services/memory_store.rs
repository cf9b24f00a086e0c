//! In-memory `SocialStore` for handler tests.

use anyhow::{bail, Result};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::HashSet;

use crate::models::{
    Connection, ConnectionEdge, ConnectionStatus, PopulatedConnection, ReceivedRequest, Session,
    User, UserProfile,
};
use crate::services::SocialStore;
use crate::utils::Pagination;

#[derive(Default)]
pub struct MemoryStore {
    pub users: Vec<UserProfile>,
    pub connections: Vec<Connection>,
    pub sessions: Vec<Session>,
    pub failure: Option<String>,
}

impl MemoryStore {
    pub fn add_user(&mut self, first_name: &str) -> ObjectId {
        let id = ObjectId::new();
        self.users.push(UserProfile {
            id,
            first_name: Some(first_name.to_string()),
            last_name: Some("Doe".to_string()),
            gender: Some("other".to_string()),
            skills: vec!["rust".to_string()],
            profile_picture: Some(format!("https://img.example/{}.png", first_name)),
            bio: Some(format!("{} bio", first_name)),
        });
        id
    }

    pub fn connect(&mut self, from: ObjectId, to: ObjectId, status: ConnectionStatus) {
        self.connections.push(Connection {
            id: ObjectId::new(),
            from_user_id: from,
            to_user_id: to,
            status,
        });
    }

    pub fn login(&mut self, user_id: ObjectId) -> String {
        let token = format!("token-{}", user_id.to_hex());
        self.sessions.push(Session {
            token: token.clone(),
            user_id,
        });
        token
    }

    fn check(&self) -> Result<()> {
        if let Some(message) = &self.failure {
            bail!("{}", message);
        }
        Ok(())
    }

    fn profile(&self, id: &ObjectId, with_bio: bool) -> Option<UserProfile> {
        self.users.iter().find(|u| u.id == *id).map(|u| UserProfile {
            bio: if with_bio { u.bio.clone() } else { None },
            ..u.clone()
        })
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn find_session_user(&self, token: &str) -> Result<Option<User>> {
        let Some(session) = self.sessions.iter().find(|s| s.token == token) else {
            return Ok(None);
        };
        Ok(self.profile(&session.user_id, false).map(|p| User {
            id: p.id,
            first_name: p.first_name.unwrap_or_default(),
        }))
    }

    async fn received_requests(&self, user_id: &ObjectId) -> Result<Vec<ReceivedRequest>> {
        self.check()?;
        Ok(self
            .connections
            .iter()
            .filter(|c| c.to_user_id == *user_id && c.status == ConnectionStatus::Interested)
            .map(|c| ReceivedRequest {
                id: c.id,
                from_user_id: self.profile(&c.from_user_id, true),
                to_user_id: c.to_user_id,
                status: c.status,
            })
            .collect())
    }

    async fn accepted_connections(&self, user_id: &ObjectId) -> Result<Vec<PopulatedConnection>> {
        self.check()?;
        Ok(self
            .connections
            .iter()
            .filter(|c| {
                c.status == ConnectionStatus::Accepted
                    && (c.from_user_id == *user_id || c.to_user_id == *user_id)
            })
            .map(|c| PopulatedConnection {
                from_user_id: c.from_user_id,
                from_user: self.profile(&c.from_user_id, false),
                to_user: self.profile(&c.to_user_id, false),
            })
            .collect())
    }

    async fn connection_edges(&self, user_id: &ObjectId) -> Result<Vec<ConnectionEdge>> {
        self.check()?;
        Ok(self
            .connections
            .iter()
            .filter(|c| c.from_user_id == *user_id || c.to_user_id == *user_id)
            .map(|c| ConnectionEdge {
                from_user_id: Some(c.from_user_id),
                to_user_id: Some(c.to_user_id),
            })
            .collect())
    }

    async fn feed_users(
        &self,
        excluded: &HashSet<ObjectId>,
        pagination: Pagination,
    ) -> Result<Vec<UserProfile>> {
        self.check()?;
        Ok(self
            .users
            .iter()
            .filter(|u| !excluded.contains(&u.id))
            .skip(usize::try_from(pagination.skip()?).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.limit.unsigned_abs())?)
            .filter_map(|u| self.profile(&u.id, false))
            .collect())
    }
}
