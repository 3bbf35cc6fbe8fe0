//! Result of a single check-in request.

use axum::http::StatusCode;

use super::Registrant;

/// Outcome of [`crate::service::CheckinService::handle_checkin`].
///
/// Every variant is a normal return value; callers must handle all of
/// them. `InternalError` carries the underlying detail for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The registrant transitioned to checked in on this request.
    Success(Registrant),
    /// The registrant had already checked in; carries the stored record.
    AlreadyCheckedIn(Registrant),
    /// The request carried no usable token.
    MissingToken,
    /// The token does not resolve to a registrant.
    RegistrantNotFound,
    /// The store failed. The detail must not be shown to the user.
    InternalError(String),
}

impl Outcome {
    /// Returns `true` only for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the HTTP status code for this outcome.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Success(_) => StatusCode::OK,
            Self::AlreadyCheckedIn(_) | Self::MissingToken | Self::RegistrantNotFound => {
                StatusCode::BAD_REQUEST
            }
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the user-facing message shown on the confirmation page.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success(_) => "Welcome to the event!",
            Self::AlreadyCheckedIn(_) => "Already checked in!",
            Self::MissingToken => "Invalid QR code: Missing token",
            Self::RegistrantNotFound => "Invalid QR code: Registrant not found",
            Self::InternalError(_) => {
                "An error occurred during check-in. Please contact staff."
            }
        }
    }

    /// Returns the registrant carried by this outcome, if any.
    #[must_use]
    pub const fn registrant(&self) -> Option<&Registrant> {
        match self {
            Self::Success(r) | Self::AlreadyCheckedIn(r) => Some(r),
            Self::MissingToken | Self::RegistrantNotFound | Self::InternalError(_) => None,
        }
    }
}
