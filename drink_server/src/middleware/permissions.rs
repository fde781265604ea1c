//! Permission middleware for the drinks server.
//! This middleware can be placed on any route or service.
//!
//! It reads the bearer token from the `Authorization` header, verifies it with the [`TokenVerifier`] held in the app
//! data, and checks that the token grants the permission required by the route. If it does, the decoded
//! [`crate::auth::AuthClaims`] are put in the request extensions and the request continues. Otherwise the request is
//! answered with the failure envelope for the matching [`crate::errors::AuthError`].

use std::{pin::Pin, rc::Rc};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::{
    auth::TokenVerifier,
    errors::{AuthError, ServerError},
};

pub struct PermissionMiddlewareFactory {
    permission: &'static str,
}

impl PermissionMiddlewareFactory {
    pub fn new(permission: &'static str) -> Self {
        PermissionMiddlewareFactory { permission }
    }
}

impl<S, B> Transform<S, ServiceRequest> for PermissionMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = PermissionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(PermissionMiddlewareService { permission: self.permission, service: Rc::new(service) })
    }
}

pub struct PermissionMiddlewareService<S> {
    permission: &'static str,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for PermissionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let permission = self.permission;
        Box::pin(async move {
            let Some(verifier) = req.app_data::<web::Data<TokenVerifier>>().cloned() else {
                error!("🔑️ No token verifier has been configured. Denying access to {}", req.path());
                let err = ServerError::ConfigurationError("No token verifier configured".to_string());
                return Ok(req.error_response(err).map_into_right_body());
            };
            let header = match req.headers().get(AUTHORIZATION).map(|v| v.to_str()) {
                Some(Ok(value)) => Some(value.to_string()),
                Some(Err(_)) => {
                    let err = ServerError::from(AuthError::MalformedHeader);
                    return Ok(req.error_response(err).map_into_right_body());
                },
                None => None,
            };
            match verifier.authorize(header.as_deref(), permission).await {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                },
                Err(e) => {
                    debug!("🔑️ Access to {} {} denied. {e}", req.method(), req.path());
                    Ok(req.error_response(ServerError::from(e)).map_into_right_body())
                },
            }
        })
    }
}
