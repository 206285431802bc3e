use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::options::ClientOptions;

use super::interceptor::{RequestInterceptor, ResponseInterceptor};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session is no longer valid")]
    Unauthorized,
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Unable to reach the server: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unable to decode the server response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Backend supplied `{message}`, only present on status errors
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED.as_u16()),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode(_) => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body convention of the backend
#[derive(Deserialize, Debug)]
struct ErrorBody {
    message: String,
}

/// One configured request/response pipeline shared by every call site.
///
/// Request interceptors run in registration order before a request leaves, response interceptors
/// see every status before it is turned into a result.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ApiClient {
    pub fn new(options: &ClientOptions) -> ApiResult<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: options.resolved_base_url(),
            request_interceptors: vec![],
            response_interceptors: vec![],
        })
    }

    pub fn with_request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn with_response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.client.request(method, self.url(path));

        self.request_interceptors
            .iter()
            .fold(request, |request, interceptor| interceptor.on_request(request))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let response = self.send(self.request(Method::GET, path).query(query)).await?;

        decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;

        decode(response).await
    }

    /// Sends a body and ignores whatever the backend answers with
    pub async fn send_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<()> {
        self.send(self.request(method, path).json(body)).await?;

        Ok(())
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(self.request(Method::DELETE, path)).await?;

        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        for interceptor in &self.response_interceptors {
            interceptor.on_response(status);
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            let message = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(error_body) => error_body.message,
                Err(_) => body,
            };

            log::debug!("Request failed [Status: {}, Message: {}]", status, message);

            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;

    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
