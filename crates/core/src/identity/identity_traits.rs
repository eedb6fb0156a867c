use super::identity_model::UserProfile;

/// Read-only access to the currently authenticated user.
///
/// Absence of a user forces every owner-scoped operation to fail with
/// `Error::NotAuthenticated`.
pub trait IdentityProviderTrait: Send + Sync {
    fn current_user(&self) -> Option<UserProfile>;

    /// Identity of the current user, if any.
    fn current_owner(&self) -> Option<String> {
        self.current_user().map(|u| u.id)
    }
}
