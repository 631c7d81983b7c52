pub mod authenticator;
pub mod cookies;
pub mod delegation;
pub mod impersonation;
pub mod password;
pub mod policy;
pub mod resolver;
pub mod session;

pub use delegation::DelegationClaims;
pub use impersonation::ImpersonationService;
pub use policy::{Decision, RouteClass};
pub use resolver::{EffectiveSession, OriginalActor};
pub use session::{SessionClaims, generate_session_token, validate_session_token};
