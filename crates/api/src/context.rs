use inventorix_auth::User;
use inventorix_core::UserId;

/// The authenticated user for a request.
///
/// Inserted by the bearer middleware; every protected handler reads it.
#[derive(Debug, Clone)]
pub struct UserContext {
    user: User,
}

impl UserContext {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn user(&self) -> &User {
        &self.user
    }
}
