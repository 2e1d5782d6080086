use std::time::Duration;

use crate::Result;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::types::Method;

/// 默认单次请求超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            inner: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    pub async fn execute(&self, request: Request) -> Result<Response> {
        let url = if request.query_params.is_empty() {
            reqwest::Url::parse(&request.url)?
        } else {
            reqwest::Url::parse_with_params(&request.url, &request.query_params)?
        };
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Patch => reqwest::Method::PATCH,
        };
        let mut req = self.inner.request(method, url).headers(request.headers);

        if let Some(body) = request.body
            && request.method.allows_body()
        {
            req = req.body(body);
        }

        let start = std::time::Instant::now();
        let response = req.send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let duration = start.elapsed();

        Ok(Response::new(status, body, duration))
    }
}
