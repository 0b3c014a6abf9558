pub mod chat;
pub mod knowledge;
pub mod speech;

use std::time::Duration;

use serde::Serialize;
use serde_derive::Deserialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ServiceError;
use crate::domain::models::ServiceName;

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct ErrorResponse {
    code: Option<String>,
    error: Option<String>,
}

/// Shared HTTP plumbing for the assistant functions. Every service is a POST
/// to `<functions-url>/<service>` with a JSON body.
#[derive(Clone)]
pub struct FunctionsClient {
    url: String,
    token: String,
    timeout: String,
}

impl Default for FunctionsClient {
    fn default() -> FunctionsClient {
        return FunctionsClient {
            url: Config::get(ConfigKey::FunctionsURL),
            token: Config::get(ConfigKey::FunctionsToken),
            timeout: Config::get(ConfigKey::ServiceTimeout),
        };
    }
}

#[cfg(test)]
impl FunctionsClient {
    pub fn with_url(url: String) -> FunctionsClient {
        return FunctionsClient {
            url,
            token: "abc".to_string(),
            timeout: "1000".to_string(),
        };
    }
}

impl FunctionsClient {
    pub fn endpoint(&self, service: ServiceName) -> String {
        return format!(
            "{url}/{service}",
            url = self.url.trim_end_matches('/'),
            service = service.as_ref()
        );
    }

    fn timeout(&self) -> Duration {
        return Duration::from_millis(self.timeout.parse::<u64>().unwrap_or(30000));
    }

    /// Sends `body` and returns the response once its status is known to be a
    /// success.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        service: ServiceName,
        body: &T,
    ) -> Result<reqwest::Response, ServiceError> {
        if self.url.is_empty() {
            return Err(ServiceError::failed(service, "functions URL is not defined"));
        }

        let mut req = reqwest::Client::new()
            .post(self.endpoint(service))
            .timeout(self.timeout())
            .json(body);
        if !self.token.is_empty() {
            req = req
                .header("Authorization", format!("Bearer {}", self.token))
                .header("apikey", &self.token);
        }

        let res = req.send().await.map_err(|err| {
            tracing::error!(error = ?err, service = %service, "Service is not reachable");
            return ServiceError::failed(service, err);
        })?;

        return check_response(service, res).await;
    }
}

async fn check_response(
    service: ServiceName,
    res: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = res.status().as_u16();
    if res.status().is_success() {
        return Ok(res);
    }

    tracing::error!(status = status, service = %service, "Service request failed");
    if status == 429 {
        return Err(ServiceError::RateLimited(service));
    }
    if status == 402 {
        return Err(ServiceError::PaymentRequired(service));
    }

    let body = res.json::<ErrorResponse>().await.unwrap_or_default();
    if body.code.as_deref() == Some("quota_exceeded") {
        return Err(ServiceError::QuotaExceeded(service));
    }

    let reason = body
        .error
        .unwrap_or_else(|| return format!("unexpected status {status}"));
    return Err(ServiceError::failed(service, reason));
}
