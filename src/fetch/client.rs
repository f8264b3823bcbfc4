use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport seam for the dataset fetch. Tests substitute their own
/// implementation instead of hitting the public endpoint.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
