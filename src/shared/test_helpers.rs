#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        uid: "test-admin-uid".to_string(),
        email: Some("admin@reposource.test".to_string()),
        email_verified: true,
        roles: vec![crate::shared::constants::ROLE_ADMIN.to_string()],
    }
}

#[cfg(test)]
pub fn create_visitor_user() -> AuthenticatedUser {
    AuthenticatedUser {
        uid: "test-visitor-uid".to_string(),
        email: Some("visitor@reposource.test".to_string()),
        email_verified: true,
        roles: Vec::new(),
    }
}

#[cfg(test)]
async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

#[cfg(test)]
async fn inject_visitor_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_visitor_user());
    next.run(request).await
}

/// Wrap a router so every request arrives as the signed-in admin
#[cfg(test)]
pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}

/// Wrap a router so every request arrives as a signed-in user without the admin role
#[cfg(test)]
pub fn with_visitor_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_visitor_middleware))
}
