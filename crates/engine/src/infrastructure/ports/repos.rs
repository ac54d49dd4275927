//! Document mutation port.
//!
//! Mirrors the host's document API: reads by reference, partial updates keyed
//! by dotted paths, and embedded-document create/delete. Every mutation takes
//! the operation context of the event that caused it.

use async_trait::async_trait;
use itemflow_domain::{Actor, ActorId, Changes, DocumentRef, Item, ItemId, OperationContext};

use super::error::RepoError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // Reads
    async fn get_actor(&self, id: ActorId) -> Result<Option<Actor>, RepoError>;
    async fn get_item(&self, uuid: DocumentRef) -> Result<Option<Item>, RepoError>;
    /// Resolve an item template (compendium entry or world item) by uuid.
    async fn fetch_template(&self, uuid: &str) -> Result<Option<Item>, RepoError>;

    // Mutations
    async fn update_actor(
        &self,
        id: ActorId,
        changes: &Changes,
        op: &OperationContext,
    ) -> Result<Actor, RepoError>;
    async fn update_item(
        &self,
        uuid: DocumentRef,
        changes: &Changes,
        op: &OperationContext,
    ) -> Result<Item, RepoError>;
    async fn create_embedded_items(
        &self,
        actor: ActorId,
        items: Vec<Item>,
        op: &OperationContext,
    ) -> Result<Vec<Item>, RepoError>;
    async fn delete_embedded_items(
        &self,
        actor: ActorId,
        ids: Vec<ItemId>,
        op: &OperationContext,
    ) -> Result<Vec<ItemId>, RepoError>;
}
