//! Auth-flow and tab-navigation state machines. Pure state: the REPL drives
//! the transitions, the resolver decides whether login actually succeeds.

use crate::session::{Portal, Role};

/// Unauthenticated flow: role selection first, then the credential form for
/// that portal, with registration reachable from login and back.
/// Authentication itself only happens through a successful resolver login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStep {
    RoleSelection,
    Login(Portal),
    Register(Portal),
}

impl AuthStep {
    pub fn select_portal(self, portal: Portal) -> AuthStep {
        match self {
            AuthStep::RoleSelection => AuthStep::Login(portal),
            other => other,
        }
    }

    /// The admin portal has no self-service registration.
    pub fn open_register(self) -> AuthStep {
        match self {
            AuthStep::Login(p) if p != Portal::Admin => AuthStep::Register(p),
            other => other,
        }
    }

    pub fn back(self) -> AuthStep {
        match self {
            AuthStep::Register(p) => AuthStep::Login(p),
            AuthStep::Login(_) => AuthStep::RoleSelection,
            AuthStep::RoleSelection => AuthStep::RoleSelection,
        }
    }

    /// After a successful registration the user lands back on login.
    pub fn registration_done(self) -> AuthStep {
        match self {
            AuthStep::Register(p) => AuthStep::Login(p),
            other => other,
        }
    }

    pub fn portal(&self) -> Option<Portal> {
        match self {
            AuthStep::RoleSelection => None,
            AuthStep::Login(p) | AuthStep::Register(p) => Some(*p),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Summary,
    History,
    Access,
    Profile,
    Patients,
    Consultations,
    Requests,
    Results,
    Dashboard,
    Validations,
    Users,
}

impl Tab {
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Summary => "summary",
            Tab::History => "history",
            Tab::Access => "access",
            Tab::Profile => "profile",
            Tab::Patients => "patients",
            Tab::Consultations => "consultations",
            Tab::Requests => "requests",
            Tab::Results => "results",
            Tab::Dashboard => "dashboard",
            Tab::Validations => "validations",
            Tab::Users => "users",
        }
    }
}

/// Role-gated tab set. An unknown role gets no tabs at all.
pub fn tabs_for(role: Role) -> &'static [Tab] {
    match role {
        r if r.is_patient_alias() => &[Tab::Summary, Tab::History, Tab::Access, Tab::Profile],
        Role::Doctor => &[Tab::Patients, Tab::Consultations],
        Role::Laboratory => &[Tab::Requests, Tab::Results],
        Role::Admin => &[Tab::Dashboard, Tab::Validations, Tab::Users],
        _ => &[],
    }
}

/// Landing tab after session establishment.
pub fn initial_tab(role: Role) -> Option<Tab> {
    tabs_for(role).first().copied()
}

/// Tab lookup restricted to what the role may see.
pub fn tab_for_role(role: Role, name: &str) -> Option<Tab> {
    tabs_for(role).iter().copied().find(|t| t.name() == name)
}
