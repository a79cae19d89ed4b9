use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Maps the `rol` claim issued by the customer service.
    pub fn from_claim(value: &str) -> Option<Self> {
        match value {
            "ROLE_USER" => Some(Role::User),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The already-verified caller of an operation.
///
/// Built once by the HTTP boundary after the bearer token has been checked and
/// handed to the orchestrator as a plain argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub customer_id: i64,
    pub role: Role,
}

impl CallerIdentity {
    pub fn new(customer_id: i64, role: Role) -> Self {
        Self { customer_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
