//! Session establishment: login with portal/role consistency enforcement,
//! role detection from a bare token, startup bootstrap and logout.

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{AppError, AppResult};
use crate::store::{ClientStore, TOKEN_KEY};

use super::adapters;
use super::profile::{PatientDetails, UserProfile};
use super::role::{Portal, Role};
use super::session::Session;

/// Ordered role probes: (role, probe path, profile path). A 200 OR a 403
/// claims the role and stops the scan; the probes are strictly sequential and
/// first match wins. 403 counts as a match on the assumption that the backend
/// answers it only for wrong-role-but-authenticated requests; a suspended
/// account with a valid role would be misclassified here.
const ROLE_PROBES: [(Role, &str, Option<&str>); 4] = [
    (Role::Admin, "admin/statistics", None),
    (Role::Doctor, "doctors/profile/me", Some("doctors/profile/me")),
    (Role::Laboratory, "laboratories/profile/me", Some("laboratories/profile/me")),
    (Role::Patient, "patients/profile", Some("patients/profile")),
];

/// Outcome of a role-detection pass. Never an error: an unresolved role is a
/// downgraded session, and the caller decides whether that forces a logout.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub role: Role,
    pub profile: UserProfile,
    /// Every probe answered 401: the backend rejected the token itself, not
    /// just a role's resource.
    pub token_rejected: bool,
}

/// What a startup bootstrap found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// No persisted token; start at role selection.
    NoSession,
    /// The stored token produced a session (possibly role Unknown, limited UI).
    Established(Role),
    /// Every probe rejected the stored token; it was cleared.
    TokenRejected,
}

/// Owns the one `Session` per app run. The session is replaced wholesale on
/// every transition; nothing else mutates it.
pub struct SessionResolver {
    api: ApiClient,
    store: ClientStore,
    session: Session,
    records: Vec<Value>,
}

impl SessionResolver {
    pub fn new(api: ApiClient, store: ClientStore) -> Self {
        Self { api, store, session: Session::empty(), records: Vec::new() }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Medical records loaded at session establishment. Empty for every role
    /// but the patient alias.
    pub fn records(&self) -> &[Value] {
        &self.records
    }

    /// Authenticate against the claimed portal. A mismatch between the
    /// resolved role and the portal is a failed attempt: nothing is persisted
    /// and the current session is left untouched.
    pub async fn login(&mut self, email: &str, password: &str, portal: Portal) -> AppResult<&Session> {
        let resp = match self.api.authenticate(email, password).await {
            Ok(v) => v,
            // a non-2xx from the auth endpoint is a rejected attempt, not plumbing
            Err(AppError::Http { message, .. }) => return Err(AppError::auth("rejected", message)),
            Err(e) => return Err(e),
        };
        let token = adapters::extract_token(&resp)
            .ok_or_else(|| AppError::auth("missing_token", "missing token"))?;

        let (role, profile) = match adapters::extract_inline_user(&resp) {
            Some(user) => (adapters::infer_role(&user), UserProfile::from_value(&user)),
            None => {
                let r = self.resolve_profile(&token).await;
                (r.role, r.profile)
            }
        };

        if !portal.accepts(role) {
            info!(target: "tohpitoh", "auth.login rejected portal={} role={}", portal, role);
            return Err(AppError::auth(
                "role_mismatch",
                format!("role mismatch: account is not authorized for the {} portal", portal),
            ));
        }

        self.store.set(TOKEN_KEY, &token)?;
        // medical_records() skips the network entirely for non-patient roles
        self.records = self.api.medical_records(&token, role).await;
        self.session = Session { token: Some(token), role, profile };
        info!(target: "tohpitoh", "auth.login email={} role={}", email, role);
        Ok(&self.session)
    }

    /// Role detection from a bare token, used when login returns no inline
    /// user and at startup when only the persisted token exists.
    pub async fn resolve_profile(&self, token: &str) -> Resolution {
        let mut all_unauthorized = true;
        for (role, probe_path, profile_path) in ROLE_PROBES {
            let status = match self.api.probe_status(probe_path, token).await {
                Ok(s) => s.as_u16(),
                Err(e) => {
                    warn!(target: "tohpitoh", "session.probe path={} failed: {}", probe_path, e);
                    all_unauthorized = false;
                    continue;
                }
            };
            if status == 200 || status == 403 {
                debug!(target: "tohpitoh", "session.probe path={} status={} role={}", probe_path, status, role);
                let profile = self.fetch_profile_for(role, profile_path, token).await;
                return Resolution { role, profile, token_rejected: false };
            }
            if status != 401 {
                all_unauthorized = false;
            }
        }
        // No probe matched. Not fatal: claims from the token fill what they
        // can and the caller decides whether an unknown role forces logout.
        let mut profile = UserProfile::placeholder();
        if let Some(claims) = adapters::decode_token_claims(token) {
            profile.id = claims.user_id;
            if claims.email.is_some() {
                profile.email = claims.email;
            }
        }
        Resolution { role: Role::Unknown, profile, token_rejected: all_unauthorized }
    }

    async fn fetch_profile_for(&self, role: Role, profile_path: Option<&str>, token: &str) -> UserProfile {
        let mut profile = match profile_path {
            Some(path) => match self.api.get_json(path, token).await {
                Ok(body) => {
                    let user = adapters::unwrap_envelope(&body);
                    let mut p = UserProfile::from_value(user);
                    if role == Role::Patient {
                        p.patient = Some(PatientDetails::from_value(user));
                    }
                    p
                }
                Err(e) => {
                    debug!(target: "tohpitoh", "session.profile fetch path={} failed: {}", path, e);
                    UserProfile::default()
                }
            },
            // admin has no dedicated profile endpoint; the token carries what we get
            None => UserProfile::default(),
        };
        if profile.id.is_none() {
            if let Some(claims) = adapters::decode_token_claims(token) {
                profile.id = claims.user_id;
                if profile.email.is_none() {
                    profile.email = claims.email;
                }
            }
        }
        profile
    }

    /// Recover a session from the persisted token at startup. Logout is
    /// forced only when the token itself was rejected (every probe answered
    /// 401); any other resolution failure keeps the token and downgrades to
    /// an unknown-role session.
    pub async fn bootstrap(&mut self) -> AppResult<Bootstrap> {
        let Some(token) = self.store.get(TOKEN_KEY)? else {
            return Ok(Bootstrap::NoSession);
        };
        let r = self.resolve_profile(&token).await;
        if r.role == Role::Unknown && r.token_rejected {
            info!(target: "tohpitoh", "session.bootstrap stored token rejected, clearing");
            self.logout()?;
            return Ok(Bootstrap::TokenRejected);
        }
        self.records = self.api.medical_records(&token, r.role).await;
        self.session = Session { token: Some(token), role: r.role, profile: r.profile };
        info!(target: "tohpitoh", "session.bootstrap role={}", r.role);
        Ok(Bootstrap::Established(r.role))
    }

    /// Clear the persisted token and reset to an empty session. No network
    /// call. Consumers must drop any role-gated navigation state with it.
    pub fn logout(&mut self) -> AppResult<()> {
        self.store.remove(TOKEN_KEY)?;
        self.session = Session::empty();
        self.records.clear();
        info!(target: "tohpitoh", "session.logout");
        Ok(())
    }

    /// Submit a registration. Success does not log in; the caller returns to
    /// the login step.
    pub async fn register(&self, form: &RegistrationForm, portal: Portal) -> AppResult<()> {
        match self.api.register_account(&form.to_payload(portal)).await {
            Ok(_) => {
                info!(target: "tohpitoh", "auth.register email={} portal={}", form.email, portal);
                Ok(())
            }
            Err(AppError::Http { message, .. }) => Err(AppError::auth("registration_rejected", message)),
            Err(e) => Err(e),
        }
    }
}

/// Everything the registration form collects. Role-specific fields are only
/// serialized for the portal that declares them.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub license_number: String,
    pub specialty: String,
    pub hospital: String,
}

impl RegistrationForm {
    /// Role-shaped payload: common fields always; patient adds date of birth
    /// and gender; doctor adds license, specialty and hospital; laboratory
    /// the accreditation number only.
    pub fn to_payload(&self, portal: Portal) -> Value {
        let mut m = Map::new();
        m.insert("email".into(), Value::String(self.email.clone()));
        m.insert("password".into(), Value::String(self.password.clone()));
        m.insert("first_name".into(), Value::String(self.first_name.clone()));
        m.insert("last_name".into(), Value::String(self.last_name.clone()));
        m.insert("phone".into(), Value::String(self.phone.clone()));
        m.insert("role".into(), Value::String(portal.wire_role().to_string()));
        match portal {
            Portal::Patient => {
                m.insert("date_of_birth".into(), Value::String(self.date_of_birth.clone()));
                m.insert("gender".into(), Value::String(self.gender.clone()));
            }
            Portal::Doctor => {
                m.insert("license_number".into(), Value::String(self.license_number.clone()));
                m.insert("specialty".into(), Value::String(self.specialty.clone()));
                m.insert("hospital".into(), Value::String(self.hospital.clone()));
            }
            Portal::Laboratory => {
                m.insert("license_number".into(), Value::String(self.license_number.clone()));
            }
            Portal::Admin => {}
        }
        Value::Object(m)
    }
}
