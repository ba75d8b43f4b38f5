//! 访问日志
//!
//! 每个请求处理完成后输出一行类似 Common Log Format 的记录：
//!
//! ```text
//! 127.0.0.1:53422 - - [05/Mar/2024:14:07:09 +0800] "GET /a.txt HTTP/1.0" 200 1.2ms
//! ```

use log::info;

use crate::logging::ACCESS_TARGET;
use axum::{
    extract::{ConnectInfo, Request},
    http::{Method, StatusCode, Uri, Version},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Local, TimeZone};
use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

pub async fn access_log(req: Request, next: Next) -> Response {
    let started_at = Local::now();
    let start = Instant::now();

    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "-".to_string(), |ConnectInfo(addr)| addr.to_string());
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    info!(
        target: ACCESS_TARGET,
        "{}",
        format_line(
            &remote,
            &started_at,
            &method,
            &uri,
            response.version(),
            response.status(),
            start.elapsed(),
        )
    );

    response
}

/// CLF 时间戳，如 `05/Mar/2024:14:07:09 +0800`
pub fn clf_timestamp<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    time.format("%d/%b/%Y:%H:%M:%S %z").to_string()
}

fn format_line<Tz>(
    remote: &str,
    started_at: &DateTime<Tz>,
    method: &Method,
    uri: &Uri,
    version: Version,
    status: StatusCode,
    elapsed: Duration,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!(
        "{} - - [{}] \"{} {} {:?}\" {} {:?}",
        remote,
        clf_timestamp(started_at),
        method,
        uri,
        version,
        status.as_u16(),
        elapsed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn fixed_time() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .unwrap()
    }

    #[test]
    fn test_clf_timestamp() {
        assert_eq!(clf_timestamp(&fixed_time()), "05/Mar/2024:14:07:09 +0800");
    }

    #[test]
    fn test_format_line() {
        let uri: Uri = "/docs/a.txt?x=1".parse().unwrap();
        let line = format_line(
            "127.0.0.1:53422",
            &fixed_time(),
            &Method::GET,
            &uri,
            Version::HTTP_10,
            StatusCode::OK,
            Duration::from_millis(3),
        );

        assert_eq!(
            line,
            "127.0.0.1:53422 - - [05/Mar/2024:14:07:09 +0800] \"GET /docs/a.txt?x=1 HTTP/1.0\" 200 3ms"
        );
    }
}
