use std::future::{Ready, ready};

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::LocalBoxFuture;
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Correlation id of the current request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

/// Tags every request with a correlation id. A well-formed incoming
/// `X-Correlation-ID` is reused; otherwise a fresh UUID is generated. The id
/// is echoed on the response so access logs and clients can match them up.
pub struct RequestIdMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestIdMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddlewareService { service }))
    }
}

pub struct RequestIdMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddlewareService<S>
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
        let header_value = req
            .headers()
            .get(CORRELATION_HEADER)
            .filter(|value| value.to_str().is_ok_and(|s| !s.trim().is_empty()))
            .cloned()
            .unwrap_or_else(|| {
                // a hyphenated UUID is always a valid header value
                HeaderValue::from_str(&Uuid::new_v4().to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
            });

        let correlation_id = header_value.to_str().unwrap_or("unknown").to_string();
        req.extensions_mut().insert(CorrelationId(correlation_id));

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            res.headers_mut()
                .insert(HeaderName::from_static(CORRELATION_HEADER), header_value);
            Ok(res)
        })
    }
}

// Extension trait to easily get correlation ID from request
pub trait RequestIdExt {
    fn correlation_id(&self) -> Option<String>;
}

impl RequestIdExt for actix_web::HttpRequest {
    fn correlation_id(&self) -> Option<String> {
        self.extensions().get::<CorrelationId>().map(|id| id.0.clone())
    }
}

impl RequestIdExt for ServiceRequest {
    fn correlation_id(&self) -> Option<String> {
        self.extensions().get::<CorrelationId>().map(|id| id.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpRequest, HttpResponse, test, web};

    async fn echo(req: HttpRequest) -> HttpResponse {
        HttpResponse::Ok().body(req.correlation_id().unwrap_or_default())
    }

    #[actix_web::test]
    async fn reuses_the_incoming_correlation_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/", web::get().to(echo)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("X-Correlation-ID", "abc-123"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(
            res.headers().get(CORRELATION_HEADER).unwrap(),
            "abc-123"
        );
        let body = test::read_body(res).await;
        assert_eq!(body, "abc-123");
    }

    #[actix_web::test]
    async fn generates_an_id_when_missing() {
        let app = test::init_service(
            App::new()
                .wrap(RequestIdMiddleware)
                .route("/", web::get().to(echo)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        let header = res.headers().get(CORRELATION_HEADER).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(header).is_ok());
    }
}
