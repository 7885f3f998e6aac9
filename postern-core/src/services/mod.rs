//! Service layer for business logic
//!
//! This module contains the issuer and validator services plus the
//! collaborators they share: the reissue throttle and the mailer wrapper
//! that turns a token into a delivered access link.

pub mod issuer;
pub mod mailer;
pub mod throttle;
pub mod validator;

pub use issuer::IssuerService;
pub use mailer::{AccessLinkMailerService, MailerService};
pub use throttle::ReissueThrottle;
pub use validator::ValidatorService;
