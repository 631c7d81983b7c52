use crate::auth::resolver::EffectiveSession;
use crate::database::models::{Account, Role};

/// Sign-in page; the fall-through redirect target
pub const SIGN_IN_PATH: &str = "/auth/login";
/// Tenant dashboard home
pub const DASHBOARD_HOME: &str = "/dashboard";
/// Super-admin console home
pub const CONSOLE_HOME: &str = "/admin";

/// The four URL-space categories, each with its own authorization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    AuthPages,
    Dashboard,
    Console,
}

impl RouteClass {
    pub fn classify(path: &str) -> Self {
        // Auth pages are just sign-in/sign-up; the rest of /auth
        // (logout, token endpoints) stays public so rule 2 cannot lock an
        // authenticated caller out of them
        if path == "/auth/login" || path == "/auth/register" {
            RouteClass::AuthPages
        } else if path == DASHBOARD_HOME || path.starts_with("/dashboard/") {
            RouteClass::Dashboard
        } else if path == CONSOLE_HOME || path.starts_with("/admin/") {
            RouteClass::Console
        } else {
            RouteClass::Public
        }
    }
}

/// Outcome of the access policy for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(&'static str),
}

/// Evaluate the access policy for a route class against the real identity
/// and the resolved effective session.
///
/// Tenant routes honor the *effective* role while console routes require
/// the *real, non-impersonating* role. That asymmetry is the point: an
/// impersonating admin gets exactly the target's dashboard and nothing of
/// the console, so delegated and privileged capabilities are never live in
/// the same session.
pub fn evaluate(
    class: RouteClass,
    identity: Option<&Account>,
    session: Option<&EffectiveSession>,
) -> Decision {
    let impersonating = session.map(|s| s.is_impersonating).unwrap_or(false);

    match class {
        RouteClass::Public => Decision::Allow,

        RouteClass::AuthPages => match identity {
            None => Decision::Allow,
            Some(identity) => {
                if identity.role == Role::SuperAdmin && !impersonating {
                    Decision::Redirect(CONSOLE_HOME)
                } else {
                    Decision::Redirect(DASHBOARD_HOME)
                }
            }
        },

        RouteClass::Dashboard => match (identity, session) {
            (Some(_), Some(session)) if session.role.is_tenant_role() => Decision::Allow,
            (Some(identity), Some(_)) if identity.role == Role::SuperAdmin => {
                // Not impersonating (an impersonated session has a tenant
                // role); the console is the admin's home, not the dashboard
                Decision::Redirect(CONSOLE_HOME)
            }
            _ => Decision::Redirect(SIGN_IN_PATH),
        },

        RouteClass::Console => match (identity, session) {
            (Some(identity), Some(session))
                if identity.role == Role::SuperAdmin && !session.is_impersonating =>
            {
                Decision::Allow
            }
            (Some(_), Some(session)) if session.is_impersonating => {
                Decision::Redirect(DASHBOARD_HOME)
            }
            _ => Decision::Redirect(SIGN_IN_PATH),
        },
    }
}
