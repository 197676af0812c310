use crate::adjudication::Reviewer;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Caller identity placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    /// The caller as a leave reviewer; reviewers must have an employee profile.
    pub fn reviewer(&self) -> actix_web::Result<Reviewer> {
        let employee_id = self
            .employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

        Ok(Reviewer {
            employee_id,
            role: self.role,
        })
    }
}
