//! 协议版本改写
//!
//! 请求在交给下游处理前被改写为配置的协议版本，响应也标记为同一版本，
//! 因此客户端在状态行中看到的总是配置的版本。

use crate::config::HttpProtocol;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

pub async fn force_protocol(
    State(protocol): State<HttpProtocol>,
    mut req: Request,
    next: Next,
) -> Response {
    *req.version_mut() = protocol.version();

    let mut response = next.run(req).await;
    *response.version_mut() = protocol.version();
    response
}
