use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::future::{Ready, ready};
use std::rc::Rc;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

type HmacSha256 = Hmac<Sha256>;

/// 管理接口鉴权：比对 `X-Admin-Key` 与配置中的密钥
pub struct AdminKeyMiddleware {
    api_key: Rc<str>,
}

impl AdminKeyMiddleware {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Rc::from(api_key.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AdminKeyMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdminKeyMiddlewareService {
            service,
            api_key: self.api_key.clone(),
        }))
    }
}

pub struct AdminKeyMiddlewareService<S> {
    service: S,
    api_key: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for AdminKeyMiddlewareService<S>
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
        // 放行 CORS 预检请求
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        // 未配置密钥时一律拒绝
        if self.api_key.is_empty() {
            log::warn!("Admin request to {} rejected: no admin key configured", req.path());
            let error = AppError::AuthError("Admin access is disabled".to_string());
            return Box::pin(async move { Err(error.into()) });
        }

        let verdict = match req
            .headers()
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some(key) if keys_match(key.as_bytes(), self.api_key.as_bytes()) => Ok(()),
            Some(_) => Err("Invalid admin key"),
            None => Err("Missing admin key"),
        };

        match verdict {
            Ok(()) => Box::pin(self.service.call(req)),
            Err(reason) => {
                log::warn!("Admin request to {} rejected: {reason}", req.path());
                let error = AppError::AuthError(reason.to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// 以 HMAC 标签比较，耗时与首个不同字节的位置以及长度无关
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    let tag = |key: &[u8]| {
        HmacSha256::new_from_slice(key).map(|mut mac| {
            mac.update(ADMIN_KEY_HEADER.as_bytes());
            mac
        })
    };
    match (tag(provided), tag(expected)) {
        (Ok(provided), Ok(expected)) => provided
            .verify_slice(&expected.finalize().into_bytes())
            .is_ok(),
        _ => false,
    }
}
