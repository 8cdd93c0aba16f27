use super::profile::UserProfile;
use super::role::Role;

/// The resolved in-memory representation of the current actor. One instance
/// per app run, owned by the resolver and replaced wholesale. A present token
/// means authenticated until explicitly cleared; role `Unknown` means profile
/// resolution failed and grants no role-gated view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub role: Role,
    pub profile: UserProfile,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
