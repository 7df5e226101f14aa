//! `WithWorkspace` middleware
//!
//! Authenticates the API key, resolves the workspace (and optionally a link)
//! and stores a [`WorkspaceContext`] in the request extensions. Handlers take
//! it as `web::ReqData<WorkspaceContext>`.

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::AUTHORIZATION,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use serde::Deserialize;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, error};

use crate::errors::LinkhubError;
use crate::services::{AuthInput, AuthService, WorkspaceContext, WorkspaceOptions};
use crate::storage::Plan;

/// Query parameters read by the authorizer
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthQuery {
    workspace_id: Option<String>,
    project_slug: Option<String>,
    link_id: Option<String>,
    domain: Option<String>,
    key: Option<String>,
}

#[derive(Clone, Default)]
pub struct WithWorkspace {
    options: Rc<WorkspaceOptions>,
}

impl WithWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject workspaces whose usage is over their click limit
    pub fn need_not_exceeded_clicks(mut self) -> Self {
        Rc::make_mut(&mut self.options).need_not_exceeded_clicks = true;
        self
    }

    pub fn required_plans(mut self, plans: &[Plan]) -> Self {
        Rc::make_mut(&mut self.options).required_plans = Some(plans.to_vec());
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for WithWorkspace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = WithWorkspaceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(WithWorkspaceMiddleware {
            service: Rc::new(service),
            options: self.options.clone(),
        }))
    }
}

pub struct WithWorkspaceMiddleware<S> {
    service: Rc<S>,
    options: Rc<WorkspaceOptions>,
}

impl<S, B> Service<ServiceRequest> for WithWorkspaceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let options = self.options.clone();

        Box::pin(async move {
            let Some(auth) = req.app_data::<web::Data<Arc<AuthService>>>().cloned() else {
                error!("AuthService is not registered as app data");
                let err = LinkhubError::database_config("authentication is not configured");
                return Ok(req.into_response(err.error_response().map_into_right_body()));
            };

            let query = web::Query::<AuthQuery>::from_query(req.query_string())
                .map(web::Query::into_inner)
                .unwrap_or_default();
            let authorization = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string);

            let input = AuthInput {
                authorization: authorization.as_deref(),
                workspace_id: query.workspace_id.as_deref(),
                project_slug: query.project_slug.as_deref(),
                link_id: query.link_id.as_deref(),
                domain: query.domain.as_deref(),
                key: query.key.as_deref(),
            };

            match auth.authorize(input, &options).await {
                Ok(ctx) => {
                    debug!(
                        "Authorized workspace {} via token {}",
                        ctx.workspace.id, ctx.token.id
                    );
                    req.extensions_mut().insert::<WorkspaceContext>(ctx);
                    let res = srv.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    debug!("Workspace authorization failed: {}", e);
                    Ok(req.into_response(e.error_response().map_into_right_body()))
                }
            }
        })
    }
}
