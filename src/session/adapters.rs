//! Response-shape adapters for the backend's loosely specified payloads.
//! Each known variant gets its own named adapter; extraction tries them in a
//! fixed declared order, so a new backend shape is a new entry in a table
//! rather than another inline field lookup at a call site.

use base64::Engine;
use serde_json::Value;

use super::role::Role;

/// Token field names observed in auth responses, in probe order.
const TOKEN_FIELDS: [&str; 4] = ["token", "accessToken", "access", "key"];

pub fn extract_token(v: &Value) -> Option<String> {
    TOKEN_FIELDS.iter().find_map(|f| field_string(v, f))
}

type UserAdapter = fn(&Value) -> Option<Value>;

fn user_from_user_field(v: &Value) -> Option<Value> {
    v.get("user").filter(|u| u.is_object()).cloned()
}

fn user_from_data_field(v: &Value) -> Option<Value> {
    v.get("data").filter(|u| u.is_object()).cloned()
}

// Flat responses carry the user at the top level, recognizable by a role field.
fn user_from_flat(v: &Value) -> Option<Value> {
    if v.get("role").is_some() { Some(v.clone()) } else { None }
}

const USER_ADAPTERS: [UserAdapter; 3] = [user_from_user_field, user_from_data_field, user_from_flat];

pub fn extract_inline_user(v: &Value) -> Option<Value> {
    USER_ADAPTERS.iter().find_map(|adapt| adapt(v))
}

/// Role carried by an inline user object. An explicit `role` wins; elevated
/// privilege flags mean admin; a `user_type` field is taken at face value;
/// anything else is the legacy untyped `user`.
pub fn infer_role(user: &Value) -> Role {
    if let Some(r) = field_string(user, "role") {
        return Role::from_wire(&r);
    }
    if flag(user, "is_superuser") || flag(user, "is_staff") {
        return Role::Admin;
    }
    if let Some(t) = field_string(user, "user_type") {
        return Role::from_wire(&t);
    }
    Role::User
}

/// Profile fetches come back bare or wrapped under `user` or `data`.
pub fn unwrap_envelope(v: &Value) -> &Value {
    v.get("user").or_else(|| v.get("data")).unwrap_or(v)
}

/// List endpoints answer a bare array, or wrap it under `records` or `data`.
/// Anything else is an empty list.
pub fn unwrap_list(v: &Value) -> Vec<Value> {
    if let Some(arr) = v.as_array() {
        return arr.clone();
    }
    for field in ["records", "data"] {
        if let Some(arr) = v.get(field).and_then(|x| x.as_array()) {
            return arr.clone();
        }
    }
    Vec::new()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenClaims {
    pub user_id: Option<String>,
    pub email: Option<String>,
}

/// Best-effort decode of the token's payload segment. The token is otherwise
/// opaque; failures are non-fatal and leave the fields blank.
pub fn decode_token_claims(token: &str) -> Option<TokenClaims> {
    let segment = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| base64::engine::general_purpose::STANDARD.decode(segment))
        .ok()?;
    let v: Value = serde_json::from_slice(&bytes).ok()?;
    Some(TokenClaims {
        user_id: field_string(&v, "userId").or_else(|| field_string(&v, "sub")),
        email: field_string(&v, "email"),
    })
}

/// String-or-number field accessor; ids in particular show up as both.
pub fn field_string(v: &Value, key: &str) -> Option<String> {
    match v.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn flag(v: &Value, key: &str) -> bool {
    match v.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        _ => false,
    }
}
