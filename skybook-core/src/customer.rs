use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skybook_shared::Masked;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::{CoreError, CoreResult, RemoteEntity};

/// Display-only view of a customer record owned by the customer service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerProjection {
    pub id: i64,
    pub full_name: String,
    pub email: Masked<String>,
    pub document_id: Masked<String>,
}

#[async_trait]
pub trait CustomerLookupClient: Send + Sync {
    async fn fetch(&self, customer_id: i64) -> CoreResult<CustomerProjection>;
}

/// In-memory customer directory used by tests and local runs.
#[derive(Default)]
pub struct InMemoryCustomerDirectory {
    customers: RwLock<HashMap<i64, CustomerProjection>>,
    unavailable: AtomicBool,
    fetches: AtomicUsize,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, customer: CustomerProjection) {
        self.customers.write().await.insert(customer.id, customer);
    }

    pub async fn remove(&self, customer_id: i64) {
        self.customers.write().await.remove(&customer_id);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CustomerLookupClient for InMemoryCustomerDirectory {
    async fn fetch(&self, customer_id: i64) -> CoreResult<CustomerProjection> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CoreError::RemoteUnavailable {
                entity: RemoteEntity::Customer,
                message: "connection refused".to_string(),
            });
        }
        self.customers
            .read()
            .await
            .get(&customer_id)
            .cloned()
            .ok_or(CoreError::RemoteNotFound { entity: RemoteEntity::Customer, id: customer_id })
    }
}
