//! Domain layer: registrant record, identifiers, and check-in outcomes.
//!
//! This module contains the server-side domain model: the normalized
//! [`Email`] primary key, the opaque [`CheckinToken`], the [`Registrant`]
//! record with its [`CheckinState`], and the [`Outcome`] returned for every
//! check-in request.

pub mod email;
pub mod outcome;
pub mod registrant;
pub mod token;

pub use email::Email;
pub use outcome::Outcome;
pub use registrant::{CheckinState, Registrant};
pub use token::CheckinToken;
