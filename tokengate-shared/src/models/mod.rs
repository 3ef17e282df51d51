/// Data models
///
/// - [`user`]: User records, roles and the user-lookup seam

pub mod user;

pub use user::{InMemoryUserStore, NewUser, Role, UserRecord, UserStore, UserStoreError};
