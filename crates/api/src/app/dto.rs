use serde::Deserialize;
use serde_json::{json, Value};

use inventorix_auth::User;
use inventorix_infra::access::products::ProductView;
use inventorix_inventory::{Category, Warehouse};

// -------------------------
// Request DTOs
// -------------------------

/// Missing fields are treated as bad credentials, not as a malformed body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "business_name": user.business_name,
        "username": user.username,
        "email": user.email,
        "created_at": user.created_at.to_rfc3339(),
    })
}

pub fn category_to_json(c: &Category) -> Value {
    json!({
        "id": c.id,
        "name": c.name,
        "in_stock": c.in_stock,
        "user_id": c.user_id,
    })
}

pub fn warehouse_to_json(w: &Warehouse) -> Value {
    json!({
        "id": w.id,
        "name": w.name,
        "location": w.location,
        "supplier": w.supplier,
        "user_id": w.user_id,
    })
}

pub fn product_to_json(view: &ProductView) -> Value {
    let p = &view.product;
    json!({
        "id": p.id,
        "name": p.name,
        "price": p.price,
        "quantity": p.quantity,
        "created_at": p.created_at.to_rfc3339(),
        "category_id": p.category_id,
        "warehouse_id": p.warehouse_id,
        "user_id": p.user_id,
        "category": view.category,
        "warehouse": view.warehouse,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use inventorix_auth::Credential;
    use inventorix_core::UserId;

    use super::*;

    #[test]
    fn user_json_never_carries_the_hash() {
        let user = User {
            id: UserId::new(1),
            business_name: "X".into(),
            username: "bob123".into(),
            email: "b@x.com".into(),
            credential: Credential::from_phc("$argon2id$v=19$secret"),
            created_at: Utc::now(),
        };
        let body = user_to_json(&user);
        assert_eq!(body["id"], 1);
        assert!(!body.to_string().contains("argon2"));
        assert!(body.get("password").is_none());
    }
}
