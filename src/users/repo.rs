use std::sync::Arc;

use crate::storage::UserStore;
use crate::users::{error::UserError, repo_types::User};

/// Pass-through over a [`UserStore`] that speaks the service's error taxonomy.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, login: &str, password: &str) -> Result<User, UserError> {
        Ok(self.store.insert(login, password).await?)
    }

    pub async fn list(&self) -> Result<Vec<User>, UserError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn get(&self, id: i64) -> Result<User, UserError> {
        Ok(self.store.get_by_id(id).await?)
    }

    pub async fn update(&self, id: i64, login: &str, password: &str) -> Result<User, UserError> {
        Ok(self.store.update(id, login, password).await?)
    }

    pub async fn delete(&self, id: i64) -> Result<(), UserError> {
        Ok(self.store.delete_by_id(id).await?)
    }
}
