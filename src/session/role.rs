use std::fmt::{Display, Formatter};

/// Resolved account role. `User` is the backend's legacy untyped value and is
/// treated as an alias for `Patient` everywhere through `is_patient_alias`.
/// `Unknown` means profile resolution failed and grants no role-gated view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    Patient,
    Doctor,
    Laboratory,
    Admin,
    User,
    #[default]
    Unknown,
}

impl Role {
    pub fn from_wire(s: &str) -> Role {
        match s {
            "patient" => Role::Patient,
            "doctor" => Role::Doctor,
            "laboratory" => Role::Laboratory,
            "admin" => Role::Admin,
            "user" => Role::User,
            _ => Role::Unknown,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Laboratory => "laboratory",
            Role::Admin => "admin",
            Role::User => "user",
            Role::Unknown => "unknown",
        }
    }

    /// The one place the patient-or-legacy-user rule lives.
    pub fn is_patient_alias(&self) -> bool {
        matches!(self, Role::Patient | Role::User)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// The portal a user claims at login, selected before the credential form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Portal {
    Patient,
    Doctor,
    Laboratory,
    Admin,
}

impl Portal {
    pub const ALL: [Portal; 4] = [Portal::Patient, Portal::Doctor, Portal::Laboratory, Portal::Admin];

    /// Role compatibility at login. Admin accepts only admin; the patient
    /// portal also accepts the legacy `user` value; doctor and laboratory are
    /// exact. Everything else is a mismatch.
    pub fn accepts(&self, role: Role) -> bool {
        match self {
            Portal::Admin => role == Role::Admin,
            Portal::Patient => role.is_patient_alias(),
            Portal::Doctor => role == Role::Doctor,
            Portal::Laboratory => role == Role::Laboratory,
        }
    }

    /// Role value sent in registration payloads.
    pub fn wire_role(&self) -> &'static str {
        match self {
            Portal::Patient => "patient",
            Portal::Doctor => "doctor",
            Portal::Laboratory => "laboratory",
            Portal::Admin => "admin",
        }
    }
}

impl Display for Portal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_role())
    }
}
