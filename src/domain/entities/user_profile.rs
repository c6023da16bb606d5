use uuid::Uuid;

/// A row of the `profiles` table, owned by the identity subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub email: String,
}
