use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::user::{RegisterRequest, User, UserView};
use crate::utils::hash::{hash_password, verify_password};

/// Username of the seeded account that may never be deleted
pub const ADMIN_USERNAME: &str = "admin";

/// Message raised for any unknown user or wrong password
pub const BAD_CREDENTIALS: &str = "bad credentials";

const ENTITY: &str = "User";

/// In-memory account directory
pub struct UserStore {
    inner: RwLock<Inner>,
}

struct Inner {
    users: HashMap<u64, User>,
    next_id: u64,
}

impl Inner {
    fn find_by_username(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut User, AppError> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| AppError::entity_not_found(ENTITY, "id", id))
    }
}

fn new_user(
    id: u64,
    username: String,
    email: String,
    password_hash: String,
    nickname: String,
) -> User {
    User {
        id,
        username,
        nickname,
        email,
        password_hash,
        enabled: true,
        created_at: Utc::now(),
    }
}

impl UserStore {
    /// Create a store seeded with the built-in admin account (id 1)
    pub fn new(admin_password: &str) -> Result<Self, AppError> {
        let admin = new_user(
            1,
            ADMIN_USERNAME.to_string(),
            "admin@localhost".to_string(),
            hash_password(admin_password)?,
            "Administrator".to_string(),
        );

        let mut users = HashMap::new();
        users.insert(admin.id, admin);

        Ok(Self {
            inner: RwLock::new(Inner { users, next_id: 2 }),
        })
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<UserView, AppError> {
        // hash outside the write lock
        let password_hash = hash_password(&req.password)?;
        let mut inner = self.inner.write().await;

        if inner.find_by_username(&req.username).is_some() {
            return Err(AppError::entity_exists(ENTITY, "username", &req.username));
        }
        if inner.users.values().any(|u| u.email == req.email) {
            return Err(AppError::entity_exists(ENTITY, "email", &req.email));
        }

        let id = inner.next_id;
        inner.next_id += 1;

        let nickname = req.nickname.unwrap_or_else(|| req.username.clone());
        let user = new_user(id, req.username, req.email, password_hash, nickname);
        let view = UserView::from(&user);
        inner.users.insert(id, user);

        info!("Registered user {} (id={})", view.username, id);
        Ok(view)
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserView, AppError> {
        let inner = self.inner.read().await;

        let user = match inner.find_by_username(username) {
            Some(user) if verify_password(password, &user.password_hash)? => user,
            _ => {
                debug!("Authentication failed for '{}'", username);
                return Err(AppError::bad_credentials(BAD_CREDENTIALS));
            }
        };

        if !user.enabled {
            return Err(AppError::bad_credentials("account disabled"));
        }

        Ok(UserView::from(user))
    }

    pub async fn get(&self, id: u64) -> Result<UserView, AppError> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .map(UserView::from)
            .ok_or_else(|| AppError::entity_not_found(ENTITY, "id", id))
    }

    pub async fn rename(&self, id: u64, nickname: String) -> Result<UserView, AppError> {
        let mut inner = self.inner.write().await;
        let user = inner.get_mut(id)?;
        user.nickname = nickname;
        Ok(UserView::from(&*user))
    }

    pub async fn set_enabled(&self, id: u64, enabled: bool) -> Result<UserView, AppError> {
        let mut inner = self.inner.write().await;
        let user = inner.get_mut(id)?;
        if user.username == ADMIN_USERNAME && !enabled {
            return Err(AppError::bad_request("the built-in admin account cannot be disabled"));
        }
        user.enabled = enabled;
        Ok(UserView::from(&*user))
    }

    pub async fn delete(&self, id: u64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let user = inner.get_mut(id)?;
        if user.username == ADMIN_USERNAME {
            return Err(AppError::bad_request("the built-in admin account cannot be deleted"));
        }
        inner.users.remove(&id);
        info!("Deleted user id={}", id);
        Ok(())
    }
}
