// Dashboard tier: tenant-scoped operations. The route gate admits only
// sessions whose effective role is a tenant role, which includes a super
// admin impersonating a tenant account. Every query is scoped by the
// effective session's company id.

pub mod campaigns;
pub mod contacts;
pub mod credits;
pub mod session;
pub mod templates;

use uuid::Uuid;

use crate::auth::resolver::EffectiveSession;
use crate::error::ApiError;

/// The company the effective identity operates in. Tenant roles always
/// carry one; anything else cannot have reached this tier.
pub(crate) fn tenant_scope(session: &EffectiveSession) -> Result<Uuid, ApiError> {
    session
        .company_id
        .ok_or_else(|| ApiError::forbidden("Session has no tenant scope"))
}
