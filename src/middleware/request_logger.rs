//! Request logging middleware.
//!
//! Logs one line per completed request with method, path, status and latency;
//! requests slower than the threshold are raised to a warning.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Requests slower than this are logged as warnings.
const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_secs(5);

/// Request logger middleware factory.
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

/// Request logger middleware service.
pub struct RequestLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        // The runtime proxy carries client-under-test traffic; tag it apart
        // from the management API.
        let target = if path.starts_with("/runtime/") {
            "proxy"
        } else {
            "api"
        };

        let fut = self.service.call(req);

        Box::pin(async move {
            let res = fut.await?;
            let elapsed = start.elapsed();
            let status = res.status().as_u16();

            if elapsed >= SLOW_REQUEST_THRESHOLD {
                warn!(
                    target: "api",
                    method = %method,
                    path = %path,
                    status = %status,
                    duration_ms = %elapsed.as_millis(),
                    "slow request"
                );
            } else if res.status().is_server_error() {
                warn!(
                    target: "api",
                    method = %method,
                    path = %path,
                    status = %status,
                    duration_ms = %elapsed.as_millis(),
                    remote_addr = %remote_addr,
                    "request failed"
                );
            } else {
                info!(
                    target: "api",
                    log_target = %target,
                    method = %method,
                    path = %path,
                    status = %status,
                    duration_ms = %elapsed.as_millis(),
                    remote_addr = %remote_addr,
                    "request completed"
                );
            }

            Ok(res)
        })
    }
}
