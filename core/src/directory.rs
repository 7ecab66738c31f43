use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User identifier. Assigned sequentially from 0 in registration order
/// and never reused within a session.
pub type UserId = usize;

/// Bucket count for the username index. A small prime keeps chains short
/// at the expected scale (hundreds of users).
const BUCKET_COUNT: usize = 101;

/// A registered user. `credential_ref` is opaque to the engine — the
/// surrounding application owns credential checking and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub credential_ref: String,
}

impl User {
    /// "First Last", as rendered everywhere a user is shown.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("user id {0} is already in use")]
    IdInUse(UserId),
    #[error("directory capacity {0} exceeded")]
    CapacityExceeded(usize),
}

/// Ordered user collection with a built-in username index.
///
/// The index is a djb2-hashed chaining table over usernames. Every
/// insert and remove updates it in the same operation, so it can never
/// go stale relative to the directory it serves.
pub struct UserDirectory {
    users: Vec<User>,
    buckets: Vec<Vec<UserId>>,
    capacity: usize,
    next_id: UserId,
}

/// djb2: seed 5381, `h = h * 33 + byte`, reduced modulo the bucket count.
fn bucket_of(username: &str) -> usize {
    let mut h: u32 = 5381;
    for &b in username.as_bytes() {
        h = h.wrapping_mul(33).wrapping_add(b as u32);
    }
    h as usize % BUCKET_COUNT
}

impl UserDirectory {
    pub fn new(capacity: usize) -> Self {
        Self {
            users: Vec::new(),
            buckets: vec![Vec::new(); BUCKET_COUNT],
            capacity,
            next_id: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Register a new user with the next sequential id.
    pub fn register(
        &mut self,
        username: &str,
        first_name: &str,
        last_name: &str,
        credential_ref: &str,
    ) -> Result<UserId, RegisterError> {
        if self.find_by_username(username).is_some() {
            return Err(RegisterError::UsernameTaken(username.to_string()));
        }
        if self.next_id >= self.capacity {
            return Err(RegisterError::CapacityExceeded(self.capacity));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.users.push(User {
            id,
            username: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            credential_ref: credential_ref.to_string(),
        });
        self.index_insert(username, id);
        Ok(id)
    }

    /// Insert a user restored from persistence, keeping its assigned id.
    ///
    /// Arrival order is preserved; `next_id` advances past the highest id
    /// seen so ids are never reused after a restore.
    pub fn insert_restored(&mut self, user: User) -> Result<(), RegisterError> {
        if user.id >= self.capacity {
            return Err(RegisterError::CapacityExceeded(self.capacity));
        }
        if self.find_by_id(user.id).is_some() {
            return Err(RegisterError::IdInUse(user.id));
        }
        if self.find_by_username(&user.username).is_some() {
            return Err(RegisterError::UsernameTaken(user.username));
        }

        self.next_id = self.next_id.max(user.id + 1);
        self.index_insert(&user.username, user.id);
        self.users.push(user);
        Ok(())
    }

    /// Remove a user by id. The id is never reassigned; the graph and
    /// inbox may still carry it and render it as unknown.
    pub fn remove(&mut self, id: UserId) -> Option<User> {
        let pos = self.users.iter().position(|u| u.id == id)?;
        let user = self.users.remove(pos);
        let bucket = &mut self.buckets[bucket_of(&user.username)];
        bucket.retain(|&entry| entry != id);
        info!("removed user {} ('{}')", id, user.username);
        Some(user)
    }

    pub fn find_by_id(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Indexed lookup: hash to a bucket, then scan its chain.
    pub fn find_by_username(&self, username: &str) -> Option<&User> {
        self.buckets[bucket_of(username)]
            .iter()
            .filter_map(|&id| self.find_by_id(id))
            .find(|u| u.username == username)
    }

    /// Resolve an id to its display name, if the user still exists.
    pub fn display_name(&self, id: UserId) -> Option<String> {
        self.find_by_id(id).map(User::display_name)
    }

    /// All users in arrival order — the snapshot an external persistence
    /// collaborator serializes.
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Discard and re-derive the whole index from the user list.
    ///
    /// The index is derived data and is maintained incrementally, so this
    /// is never required for correctness; it exists to re-verify that
    /// property and to recover should the buckets ever be damaged.
    pub fn rebuild_index(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        // Walk in arrival order so each chain ends most-recent-first.
        let pairs: Vec<(usize, UserId)> = self
            .users
            .iter()
            .map(|u| (bucket_of(&u.username), u.id))
            .collect();
        for (bucket, id) in pairs {
            self.buckets[bucket].insert(0, id);
        }
    }

    /// Chains are most-recently-inserted-first.
    fn index_insert(&mut self, username: &str, id: UserId) {
        self.buckets[bucket_of(username)].insert(0, id);
    }
}
