//! Session bootstrap and role resolution: the piece of the portal that
//! decides, from a bearer token alone, who the user is and what they may see.
//! Keep the public surface thin and split implementation across sub-modules.

pub mod adapters;
mod profile;
mod resolver;
mod role;
mod session;

pub use profile::{PatientDetails, UserProfile};
pub use resolver::{Bootstrap, RegistrationForm, Resolution, SessionResolver};
pub use role::{Portal, Role};
pub use session::Session;
