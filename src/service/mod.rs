//! Service layer: token resolution, the check-in state machine, and
//! registrant provisioning.

pub mod checkin;
pub mod provisioning;
pub mod resolver;

pub use checkin::{CheckinService, Transition};
pub use provisioning::ProvisioningService;
pub use resolver::{Resolution, TokenResolver};
