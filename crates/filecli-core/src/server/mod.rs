//! HTTP 文件服务器
//!
//! # 路由
//!
//! - `GET /upload-form` 上传表单页面
//! - `POST /upload` 接收 multipart 上传
//! - 其他路径: 服务目录下的静态文件与目录列表
//!
//! 所有请求都经过协议版本改写和访问日志两层中间件。

pub mod access_log;
pub mod protocol;
pub mod static_files;
pub mod upload;

use log::{error, info};

use crate::config::ServerConfig;
use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    handler::Handler,
    middleware,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

/// 构建完整的路由
pub fn router(config: Arc<ServerConfig>) -> Router {
    let listing = static_files::directory_listing.with_state(config.clone());
    let files = ServeDir::new(&config.root).fallback(listing);

    Router::new()
        .route(
            "/upload-form",
            get(upload::upload_form).fallback(upload::method_not_allowed),
        )
        .route(
            "/upload",
            post(upload::upload_handler)
                .fallback(upload::method_not_allowed)
                .layer(DefaultBodyLimit::disable()),
        )
        .fallback_service(files)
        .layer(middleware::from_fn_with_state(
            config.protocol,
            protocol::force_protocol,
        ))
        .layer(middleware::from_fn(access_log::access_log))
        .with_state(config)
}

/// 文件服务器
pub struct FileServer {
    config: Arc<ServerConfig>,
    listener: TcpListener,
}

impl FileServer {
    /// 按配置绑定监听地址
    pub async fn bind(config: ServerConfig) -> anyhow::Result<Self> {
        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to listen on {addr}"))?;

        Ok(Self {
            config: Arc::new(config),
            listener,
        })
    }

    /// 实际监听的地址（端口为 0 时由系统分配）
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// 运行服务器，直到发生致命错误
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.local_addr()?;
        info!(
            "Serving directory {:?} on {} with protocol {}",
            self.config.root, addr, self.config.protocol
        );

        let app = router(self.config);
        axum::serve(
            self.listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .context("Server failed")?;

        Ok(())
    }

    /// 在后台任务中启动服务器，返回监听地址
    pub fn start(self) -> anyhow::Result<SocketAddr> {
        let addr = self.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = self.serve().await {
                error!("Server error: {e:#}");
            }
        });

        Ok(addr)
    }
}
