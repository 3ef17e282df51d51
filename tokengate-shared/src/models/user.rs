/// User records, roles and the user-lookup seam
///
/// The gate only needs to fetch a user by username; where users actually live
/// is up to the [`UserStore`] implementation. [`InMemoryUserStore`] is the
/// reference implementation, seeded from configuration at startup.
///
/// # Roles
///
/// - **admin**: `ROLE_ADMIN`, `user:read`, `user:write`
/// - **user**: `ROLE_USER`
///
/// # Example
///
/// ```
/// use tokengate_shared::models::user::{InMemoryUserStore, NewUser, Role, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryUserStore::default();
/// store.create_user(NewUser {
///     username: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::User,
/// }).await?;
///
/// let alice = store.get_user("alice").await?.expect("just created");
/// assert_eq!(alice.role, Role::User);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{hash_map::Entry, BTreeSet, HashMap};
use tokio::sync::RwLock;

use crate::auth::principal::Principal;

/// Error type for user store operations
#[derive(Debug, thiserror::Error)]
pub enum UserStoreError {
    /// Username is already registered
    #[error("Username {0} already exists")]
    UsernameTaken(String),

    /// Backing store could not be reached
    #[error("User store unavailable: {0}")]
    Unavailable(String),
}

/// Roles a user account can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can read and manage other accounts
    Admin,

    /// Regular account
    User,
}

impl Role {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Authorities granted by this role
    pub fn granted_authorities(&self) -> BTreeSet<String> {
        let authorities: &[&str] = match self {
            Role::Admin => &["ROLE_ADMIN", "user:read", "user:write"],
            Role::User => &["ROLE_USER"],
        };

        authorities.iter().map(|a| a.to_string()).collect()
    }
}

/// Stored user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique username
    pub username: String,

    /// Password hash in PHC string format (never plaintext)
    pub password_hash: String,

    /// Role the account holds
    pub role: Role,
}

impl UserRecord {
    /// Builds the principal this account authenticates as
    pub fn principal(&self) -> Principal {
        Principal::new(self.username.clone(), self.role.granted_authorities())
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Username, must be unique
    pub username: String,

    /// Password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Role to grant
    pub role: Role,
}

/// User-lookup collaborator
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Looks up a user by username
    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, UserStoreError>;

    /// Stores a new user
    ///
    /// # Errors
    ///
    /// Returns `UserStoreError::UsernameTaken` if the username exists.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UserStoreError>;
}

/// Process-local user store
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    /// Creates a store pre-populated with users
    ///
    /// Later entries with a duplicate username replace earlier ones.
    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();

        Self {
            users: RwLock::new(users),
        }
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether the store holds no users
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, username: &str) -> Result<Option<UserRecord>, UserStoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UserStoreError> {
        let mut users = self.users.write().await;

        match users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(UserStoreError::UsernameTaken(user.username)),
            Entry::Vacant(slot) => {
                let record = UserRecord {
                    username: user.username,
                    password_hash: user.password_hash,
                    role: user.role,
                };
                Ok(slot.insert(record).clone())
            }
        }
    }
}
