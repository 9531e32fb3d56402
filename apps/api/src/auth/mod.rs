mod device;
mod password;
mod session;
pub(crate) mod session_helpers;

pub use device::{device_login_handler, redeem_invitation_handler, validate_invitation_handler};
pub use password::{change_password_handler, login_handler};
pub use session::{logout_handler, me_handler, route_decision_handler};

pub const SESSION_USER_KEY: &str = "staff_identity";
/// Absolute session creation timestamp for absolute timeout enforcement.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";
