#[cfg(test)]
#[path = "knowledge_test.rs"]
mod tests;

use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::FunctionsClient;
use crate::domain::models::NewsService;
use crate::domain::models::SearchService;
use crate::domain::models::ServiceError;
use crate::domain::models::ServiceName;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SearchRequest {
    query: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SearchResponse {
    results: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NewsRequest {
    category: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NewsResponse {
    news: String,
}

/// The `search` and `news` functions. Both return prose ready to be shown
/// as an assistant reply.
#[derive(Default)]
pub struct FunctionsKnowledge {
    client: FunctionsClient,
}

impl FunctionsKnowledge {
    pub fn new(client: FunctionsClient) -> FunctionsKnowledge {
        return FunctionsKnowledge { client };
    }
}

#[async_trait]
impl SearchService for FunctionsKnowledge {
    #[allow(clippy::implicit_return)]
    async fn search(&self, query: &str) -> Result<String, ServiceError> {
        let req = SearchRequest {
            query: query.to_string(),
        };
        let res = self.client.post(ServiceName::Search, &req).await?;
        let body = res
            .json::<SearchResponse>()
            .await
            .map_err(|err| return ServiceError::failed(ServiceName::Search, err))?;

        return Ok(body.results);
    }
}

#[async_trait]
impl NewsService for FunctionsKnowledge {
    #[allow(clippy::implicit_return)]
    async fn headlines(&self, category: &str) -> Result<String, ServiceError> {
        let req = NewsRequest {
            category: category.to_string(),
        };
        let res = self.client.post(ServiceName::News, &req).await?;
        let body = res
            .json::<NewsResponse>()
            .await
            .map_err(|err| return ServiceError::failed(ServiceName::News, err))?;

        return Ok(body.news);
    }
}
