use serde::Deserialize;

use inventorix_core::validate::{optional_text, required, text};
use inventorix_core::{DomainResult, Entity, Owned, UserId, WarehouseId};

use crate::patch;

const NAME_MAX: usize = 100;
const LOCATION_MAX: usize = 200;
const SUPPLIER_MAX: usize = 100;

/// A storage location owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub location: String,
    pub supplier: Option<String>,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarehouseDraft {
    pub name: Option<String>,
    pub location: Option<String>,
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWarehouse {
    pub name: String,
    pub location: String,
    pub supplier: Option<String>,
}

/// Patchable fields of a warehouse. `supplier: null` clears the supplier.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WarehousePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable")]
    pub supplier: Option<Option<String>>,
}

impl WarehouseDraft {
    pub fn validate(self) -> DomainResult<NewWarehouse> {
        Ok(NewWarehouse {
            name: text("name", required("name", self.name)?, NAME_MAX)?,
            location: text("location", required("location", self.location)?, LOCATION_MAX)?,
            supplier: optional_text("supplier", self.supplier, SUPPLIER_MAX)?,
        })
    }
}

impl Warehouse {
    pub fn apply(&self, patch: WarehousePatch) -> DomainResult<Warehouse> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = text("name", name, NAME_MAX)?;
        }
        if let Some(location) = patch.location {
            next.location = text("location", location, LOCATION_MAX)?;
        }
        if let Some(supplier) = patch.supplier {
            next.supplier = optional_text("supplier", supplier, SUPPLIER_MAX)?;
        }
        Ok(next)
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> WarehouseId {
        self.id
    }
}

impl Owned for Warehouse {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}
