use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{
        entity::{user::User, Entity, UserId},
        repository::{Pageable, PageableResult, UserRepository},
    },
    error::persistence::{PersistenceError, UniqueField},
};

#[derive(Debug, Default)]
struct MemoryStore {
    sequence: UserId,
    users: BTreeMap<UserId, User>,
}

impl MemoryStore {
    /// First unique field `user` shares with another stored user.
    fn violated_field(&self, user: &User) -> Option<UniqueField> {
        self.users
            .values()
            .filter(|stored| stored.ident() != user.ident())
            .find_map(|stored| {
                if stored.username() == user.username() {
                    Some(UniqueField::Username)
                } else if stored.mobile() == user.mobile() {
                    Some(UniqueField::Mobile)
                } else if stored.email() == user.email() {
                    Some(UniqueField::Email)
                } else {
                    None
                }
            })
    }
}

/// Process-local user store with the same unique constraints as the database.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    store: Mutex<MemoryStore>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_all(&self, pageable: &Pageable) -> Result<PageableResult<User>, PersistenceError> {
        let store = self.store.lock().await;

        let mut users: Vec<&User> = store.users.values().collect();
        users.sort_by(|a, b| pageable.compare(a, b));

        let offset = usize::try_from(pageable.offset()).unwrap_or(usize::MAX);
        let data = users
            .into_iter()
            .skip(offset)
            .take(pageable.size() as usize)
            .cloned()
            .collect();

        Ok(PageableResult {
            total: store.users.len() as u64,
            data,
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, PersistenceError> {
        let store = self.store.lock().await;
        Ok(store
            .users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn save(&self, user: User) -> Result<User, PersistenceError> {
        let mut store = self.store.lock().await;

        if let Some(field) = store.violated_field(&user) {
            return Err(PersistenceError::UniqueViolation(Some(field)));
        }

        let (id, user) = match user.ident() {
            Some(id) if store.users.contains_key(&id) => (id, user),
            Some(_) => return Err(PersistenceError::NotFound),
            None => {
                store.sequence += 1;
                let id = store.sequence;
                (id, user.with_assigned_id(id))
            }
        };

        store.users.insert(id, user.clone());
        Ok(user)
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), PersistenceError> {
        self.store.lock().await.users.remove(&id);
        Ok(())
    }
}
