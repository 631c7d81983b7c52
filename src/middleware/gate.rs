use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::policy::{self, Decision, RouteClass};
use crate::auth::resolver::EffectiveSession;
use crate::database::models::Account;

/// Enforce the access policy once per request, before any handler runs.
///
/// All role logic lives in `auth::policy`; handlers only ever see requests
/// the policy allowed and consume the injected identity/session extensions.
pub async fn route_gate_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    let class = RouteClass::classify(path);
    let identity = request.extensions().get::<Account>();
    let session = request.extensions().get::<EffectiveSession>();

    match policy::evaluate(class, identity, session) {
        Decision::Allow => next.run(request).await,
        Decision::Redirect(target) => {
            tracing::debug!(
                "Access policy redirected {:?} request for {} to {}",
                class,
                path,
                target
            );
            Redirect::to(target).into_response()
        }
    }
}
