use inventorix_core::UserId;

use super::AccessResult;
use crate::store::{OwnerCounts, UnitOfWork};

/// Counts of the products, categories and warehouses owned by `owner`.
pub async fn stats(uow: &mut dyn UnitOfWork, owner: UserId) -> AccessResult<OwnerCounts> {
    Ok(uow.counts(owner).await?)
}
