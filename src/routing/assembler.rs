//! Router assembly from the validated service table.
//!
//! # Responsibilities
//! - Pick the dispatch mode per service entry, in declaration order
//! - Wrap each handler with its middleware stack (logging → auth → limits)
//! - Register `route`, `route/` and `route/{*path}` for every entry
//! - Mount login/logout routes and static file servers where configured
//!
//! # Design Decisions
//! - Any failure here is fatal: the gateway refuses to serve with an
//!   incomplete table
//! - WebSocket routes never pass through the logging wrapper; the upgrade
//!   hijacks the connection, so there is no final status to capture. The
//!   WebSocket arm returns before the logging section is reached.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{ws::WebSocketUpgrade, Query, Request},
    http::{StatusCode, Uri},
    middleware,
    response::IntoResponse,
    routing::{any, get, MethodRouter},
    Form, Router,
};
use thiserror::Error;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};
use url::Url;

use crate::auth::{bearer, session, token, JwtKeys, SessionContext};
use crate::config::{AuthMode, GatewayConfig, ServiceEntry};
use crate::health::HealthMonitor;
use crate::http::websocket;
use crate::load_balancer::{Backend, LoadBalancer};
use crate::observability::logging::{access_log_middleware, AccessLog};
use crate::proxy::{self, SharedClient};
use crate::security::{
    conn_limit::{conn_limit_middleware, queue_limit_middleware},
    headers::{global_wrapper, not_found},
    rate_limit::rate_limit_middleware,
    ConnLimiter, QueueLimiter, RateLimiter,
};
use crate::templates::handler::TemplateError;
use crate::templates::TemplateService;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Startup failures during router assembly.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("service '{route}': invalid target URL '{url}': {source}")]
    InvalidTarget {
        route: String,
        url: String,
        source: url::ParseError,
    },
    #[error("service '{route}': cannot open access log {path}: {source}")]
    LogOpen {
        route: String,
        path: String,
        source: std::io::Error,
    },
    #[error("service '{route}': {source}")]
    Template { route: String, source: TemplateError },
    #[error("GATEWAY_JWT_SECRET must be set when a service requires authentication")]
    MissingSecret,
    #[error("service '{route}': auth=login requires a directory section")]
    MissingDirectory { route: String },
    #[error("failed to build outbound transport: {0}")]
    Transport(native_tls::Error),
}

/// Shared pieces handed to every service builder.
struct AssemblyContext {
    client: SharedClient,
    keys: Option<Arc<JwtKeys>>,
    rate: Option<Arc<RateLimiter>>,
    conn: Option<Arc<ConnLimiter>>,
}

/// Deterministically build the dispatch table. Health monitors for
/// load-balanced services are spawned as a side effect, so this must run
/// inside the runtime.
pub fn build_router(
    config: &GatewayConfig,
    secret: Option<&[u8]>,
) -> Result<Router, AssembleError> {
    let keys = secret.map(|s| Arc::new(JwtKeys::from_secret(s)));

    let needs_secret = config.token_route.is_some()
        || config.services.iter().any(|svc| svc.auth != AuthMode::None);
    if needs_secret && keys.is_none() {
        return Err(AssembleError::MissingSecret);
    }

    let ctx = AssemblyContext {
        client: proxy::build_client().map_err(AssembleError::Transport)?,
        keys,
        rate: config.limits.requests_per_second.map(|rps| {
            let burst = config.limits.burst.unwrap_or(rps);
            Arc::new(RateLimiter::new(rps, burst))
        }),
        conn: config
            .limits
            .max_conns_per_ip
            .map(|limit| Arc::new(ConnLimiter::new(limit))),
    };

    let mut app = Router::new();
    for svc in &config.services {
        app = app.merge(build_service(svc, config, &ctx)?);
        tracing::info!(route = %svc.route, "Registered route");
    }

    if let Some(token_route) = &config.token_route {
        app = mount_token_route(app, token_route, &ctx)?;
    }

    let mut app = app.fallback(not_found);

    if let Some(size) = config.limits.queue_size {
        let queue = Arc::new(QueueLimiter::new(size));
        app = app.layer(middleware::from_fn_with_state(
            queue,
            queue_limit_middleware,
        ));
    }

    Ok(app
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(middleware::from_fn(global_wrapper))
        .layer(TraceLayer::new_for_http()))
}

fn build_service(
    svc: &ServiceEntry,
    config: &GatewayConfig,
    ctx: &AssemblyContext,
) -> Result<Router, AssembleError> {
    if svc.is_websocket() {
        let url = parse_target(svc, svc.target_list()[0])?;
        let host: Arc<str> = Arc::from(url.authority());

        let dispatch = any(move |ws: WebSocketUpgrade, uri: Uri| {
            let host = host.clone();
            async move { websocket::handle_upgrade(ws, host, uri).await }
        });

        let service = apply_admission(register_prefix(&svc.route, dispatch), ctx);
        // No logging wrapper: the tunnel hijacks the connection.
        return apply_auth(service, svc, config, ctx);
    }

    let dispatch = if let Some(dir) = &svc.template_dir {
        let templates = Arc::new(
            TemplateService::from_dir(dir, &svc.route, svc.template_routes.clone()).map_err(
                |e| AssembleError::Template {
                    route: svc.route.clone(),
                    source: e,
                },
            )?,
        );
        any(move |req: Request| {
            let templates = templates.clone();
            async move { templates.render(req.uri().path()) }
        })
    } else {
        let targets = svc.target_list();
        if targets.len() > 1 {
            let mut backends = Vec::new();
            for raw in &targets {
                backends.push(Arc::new(Backend::new(parse_target(svc, raw)?)));
            }
            let pool = Arc::new(LoadBalancer::new(backends.clone()));
            HealthMonitor::new(backends, &config.health_check, ctx.client.clone()).spawn();

            let client = ctx.client.clone();
            any(move |req: Request| {
                let pool = pool.clone();
                let client = client.clone();
                async move {
                    match pool.select() {
                        Some(backend) => proxy::forward(&client, &backend.url, req).await,
                        None => {
                            (StatusCode::BAD_GATEWAY, "Bad Gateway: no healthy backends")
                                .into_response()
                        }
                    }
                }
            })
        } else {
            let raw = targets.first().copied().unwrap_or_default();
            let url = Arc::new(parse_target(svc, raw)?);
            let client = ctx.client.clone();
            any(move |req: Request| {
                let url = url.clone();
                let client = client.clone();
                async move { proxy::forward(&client, &url, req).await }
            })
        }
    };

    let service = apply_admission(register_prefix(&svc.route, dispatch), ctx);
    let mut service = apply_auth(service, svc, config, ctx)?;

    if let Some(dir) = &svc.template_dir {
        service = service
            .nest_service(
                &format!("{}/styles", svc.route),
                ServeDir::new(dir.join("styles")),
            )
            .nest_service(
                &format!("{}/scripts", svc.route),
                ServeDir::new(dir.join("scripts")),
            );
    }

    if let Some(path) = &svc.log {
        let log = Arc::new(AccessLog::open(path, &svc.route).map_err(|e| {
            AssembleError::LogOpen {
                route: svc.route.clone(),
                path: path.display().to_string(),
                source: e,
            }
        })?);
        service = service.layer(middleware::from_fn_with_state(log, access_log_middleware));
    }

    Ok(service)
}

fn parse_target(svc: &ServiceEntry, raw: &str) -> Result<Url, AssembleError> {
    Url::parse(raw.trim()).map_err(|e| AssembleError::InvalidTarget {
        route: svc.route.clone(),
        url: raw.to_string(),
        source: e,
    })
}

/// Register both the bare prefix and its trailing-slash form, plus a
/// catch-all for sub-paths, all pointing at the same handler.
fn register_prefix(route: &str, dispatch: MethodRouter) -> Router {
    if route == "/" {
        return Router::new()
            .route("/", dispatch.clone())
            .route("/{*path}", dispatch);
    }
    Router::new()
        .route(route, dispatch.clone())
        .route(&format!("{}/", route), dispatch.clone())
        .route(&format!("{}/{{*path}}", route), dispatch)
}

/// Per-IP admission control; the conn limiter sits closest to the handler.
fn apply_admission(mut router: Router, ctx: &AssemblyContext) -> Router {
    if let Some(conn) = &ctx.conn {
        router = router.layer(middleware::from_fn_with_state(
            conn.clone(),
            conn_limit_middleware,
        ));
    }
    if let Some(rate) = &ctx.rate {
        router = router.layer(middleware::from_fn_with_state(
            rate.clone(),
            rate_limit_middleware,
        ));
    }
    router
}

fn apply_auth(
    router: Router,
    svc: &ServiceEntry,
    config: &GatewayConfig,
    ctx: &AssemblyContext,
) -> Result<Router, AssembleError> {
    match svc.auth {
        AuthMode::None => Ok(router),
        AuthMode::Private => {
            let keys = ctx.keys.clone().ok_or(AssembleError::MissingSecret)?;
            Ok(router.layer(middleware::from_fn_with_state(
                keys,
                bearer::bearer_middleware,
            )))
        }
        AuthMode::Login => {
            let keys = ctx.keys.clone().ok_or(AssembleError::MissingSecret)?;
            let directory = config.directory.clone().map(Arc::new).ok_or_else(|| {
                AssembleError::MissingDirectory {
                    route: svc.route.clone(),
                }
            })?;
            let session_ctx = SessionContext {
                keys,
                route: Arc::from(svc.route.as_str()),
                duration_secs: svc.session_duration,
                directory,
            };

            let router = router.layer(middleware::from_fn_with_state(
                session_ctx.clone(),
                session::session_middleware,
            ));
            // Mounted after the layer so the login flow itself is reachable
            // without a session.
            Ok(mount_login_routes(router, &svc.route, session_ctx))
        }
    }
}

fn mount_login_routes(router: Router, route: &str, ctx: SessionContext) -> Router {
    let submit_ctx = ctx.clone();
    let login = get(session::login_page).post(move |form: Form<session::LoginForm>| {
        let ctx = submit_ctx.clone();
        async move { session::login_submit(ctx, form).await }
    });

    let logout = any(move || {
        let ctx = ctx.clone();
        async move { session::logout(ctx).await }
    });

    router
        .route(&format!("{}/login", route), login.clone())
        .route(&format!("{}/login/", route), login)
        .route(&format!("{}/logout", route), logout.clone())
        .route(&format!("{}/logout/", route), logout)
}

fn mount_token_route(
    router: Router,
    token_route: &str,
    ctx: &AssemblyContext,
) -> Result<Router, AssembleError> {
    let keys = ctx.keys.clone().ok_or(AssembleError::MissingSecret)?;
    let handler = get(move |Query(query): Query<token::TokenQuery>| {
        let keys = keys.clone();
        async move { token::issue_token(&keys, query).await }
    });

    Ok(router
        .route(token_route, handler.clone())
        .route(&format!("{}/", token_route), handler))
}
