use std::sync::Arc;

pub type AuthRedirectBox = Arc<dyn AuthRedirect + Send + Sync>;

/// Where a caller is sent when the backend rejects the stored credential.
pub trait AuthRedirect {
    /// True while the caller is already on the sign-in flow, in which case a
    /// 401 is a plain credential rejection and no redirect happens.
    fn is_on_auth_view(&self) -> bool;

    fn redirect_to_auth(&self);
}
