use std::fmt;

use crate::{ProbeError, Result};

/// 被测服务默认监听端口
pub const DEFAULT_PORT: u16 = 8001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }

    /// 是否携带请求体（GET/DELETE 不发送 body）
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 被测服务的根地址，例如 `http://localhost:8001`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl BaseUrl {
    /// 默认 host，当 URL 中未指定 host 时使用
    const DEFAULT_HOST: &'static str = "localhost";
    /// 默认 scheme，当 URL 中未指定 scheme 时使用
    const DEFAULT_SCHEME: &'static str = "http";

    pub fn parse(s: &str) -> Result<Self> {
        let input = s.trim();
        if input.is_empty() {
            return Err(ProbeError::InvalidUrl("empty base URL".to_string()));
        }

        // 处理简化格式:
        // 1. ":8001" -> "http://localhost:8001"
        // 2. "localhost:8001" -> "http://localhost:8001"
        // 3. "https://:8443" -> "https://localhost:8443"
        let normalized = if input.starts_with(':') {
            format!("{}://{}{}", Self::DEFAULT_SCHEME, Self::DEFAULT_HOST, input)
        } else if let Some(pos) = input.find("://") {
            let after_scheme = &input[pos + 3..];
            if after_scheme.starts_with(':') {
                format!("{}://{}{}", &input[..pos], Self::DEFAULT_HOST, after_scheme)
            } else {
                input.to_string()
            }
        } else {
            format!("{}://{}", Self::DEFAULT_SCHEME, input)
        };

        let url = url::Url::parse(&normalized)?;

        let default_port = match url.scheme() {
            "https" => 443,
            "http" => 80,
            other => {
                return Err(ProbeError::InvalidUrl(format!(
                    "unsupported scheme '{}' in {}",
                    other, input
                )));
            }
        };

        if url.query().is_some() || url.fragment().is_some() {
            return Err(ProbeError::InvalidUrl(format!(
                "base URL must not carry a query or fragment: {}",
                input
            )));
        }

        Ok(BaseUrl {
            scheme: url.scheme().to_string(),
            host: url
                .host_str()
                .map(|h| h.to_string())
                .unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            port: url.port().unwrap_or(default_port),
            path: url.path().trim_end_matches('/').to_string(),
        })
    }

    /// 拼接 `{base}/{prefix}/{endpoint}`，每个连接处只保留一个 `/`
    pub fn join(&self, prefix: &str, endpoint: &str) -> String {
        let prefix = prefix.trim_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        if prefix.is_empty() {
            format!("{}/{}", self, endpoint)
        } else {
            format!("{}/{}/{}", self, prefix, endpoint)
        }
    }
}

impl Default for BaseUrl {
    /// `http://localhost:8001`
    fn default() -> Self {
        Self {
            scheme: Self::DEFAULT_SCHEME.to_string(),
            host: Self::DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: String::new(),
        }
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }
}

/// 响应状态码；接受服务器返回的任何值，不在此处校验范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u16);

impl Status {
    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    pub fn reason_phrase(&self) -> Option<&'static str> {
        reason_phrase(self.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason_phrase() {
            Some(reason) => write!(f, "{} {}", self.0, reason),
            None => write!(f, "{}", self.0),
        }
    }
}

/// 常见状态码的原因短语，未知状态码返回 None
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    let reason = match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => return None,
    };
    Some(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_base_url() {
        let url = BaseUrl::parse("https://learn.example.com:8443/backend").unwrap();
        assert_eq!(url.scheme, "https");
        assert_eq!(url.host, "learn.example.com");
        assert_eq!(url.port, 8443);
        assert_eq!(url.path, "/backend");
    }

    #[test]
    fn test_parse_default_ports() {
        assert_eq!(BaseUrl::parse("https://example.com").unwrap().port, 443);
        assert_eq!(BaseUrl::parse("http://example.com").unwrap().port, 80);
    }

    #[test]
    fn test_parse_shorthand() {
        let url = BaseUrl::parse(":8001").unwrap();
        assert_eq!(url.to_string(), "http://localhost:8001");

        let url = BaseUrl::parse("localhost:8001").unwrap();
        assert_eq!(url.to_string(), "http://localhost:8001");

        let url = BaseUrl::parse("https://:8443").unwrap();
        assert_eq!(url.to_string(), "https://localhost:8443");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(BaseUrl::parse("").is_err());
        assert!(BaseUrl::parse("ftp://example.com").is_err());
        assert!(BaseUrl::parse("http://example.com/?x=1").is_err());
    }

    #[test]
    fn test_join_endpoint() {
        let url = BaseUrl::parse("http://localhost:8001/").unwrap();
        assert_eq!(url.join("api", "health"), "http://localhost:8001/api/health");
        assert_eq!(url.join("/api/", "/lessons/7"), "http://localhost:8001/api/lessons/7");
        assert_eq!(url.join("api", ""), "http://localhost:8001/api/");
        assert_eq!(url.join("", "health"), "http://localhost:8001/health");
    }

    #[test]
    fn test_join_keeps_base_path() {
        let url = BaseUrl::parse("http://example.com:9000/backend/").unwrap();
        assert_eq!(
            url.join("api", "auth/me"),
            "http://example.com:9000/backend/api/auth/me"
        );
    }

    #[test]
    fn test_default_base_url() {
        let url = BaseUrl::default();
        assert_eq!(url.to_string(), "http://localhost:8001");
        assert_eq!(BaseUrl::parse(":8001").unwrap(), url);
        assert_eq!(BaseUrl::parse("http://localhost:8001").unwrap(), url);
    }

    #[test]
    fn test_method_body() {
        assert!(Method::Put.allows_body());
        assert!(!Method::Get.allows_body());
        assert!(!Method::Delete.allows_body());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::new(403).to_string(), "403 Forbidden");
        assert_eq!(Status::new(405).reason_phrase(), Some("Method Not Allowed"));
        // 非标准状态码原样保留
        assert_eq!(Status::new(700).code(), 700);
        assert_eq!(Status::new(700).to_string(), "700");
        assert_eq!(Status::new(99).to_string(), "99");
    }
}
