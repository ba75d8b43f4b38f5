//! HTTP 传输客户端
//!
//! 与 [`crate::server`] 配套：
//!
//! - 下载: `GET http://<server>/<remotePath>`，响应体写入本地文件
//! - 上传: `POST http://<server>/upload`，multipart 表单 (`file` + 可选 `dest`)
//!
//! 请求按顺序执行，没有重试和超时设置。

mod download;
mod upload;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 客户端错误，每个失败阶段一个变体
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to initialize HTTP client")]
    Init(#[source] reqwest::Error),

    #[error("Unable to connect to server")]
    Connect(#[source] reqwest::Error),

    #[error("Server returns error: {0}")]
    Status(String),

    #[error("Unable to create file {path:?}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Download file failed")]
    Download(#[source] io::Error),

    #[error("Unable to open file {path:?}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read file contents")]
    ReadFile(#[source] io::Error),

    #[error("Failed to create form")]
    BuildForm(#[source] reqwest::Error),

    #[error("Sending request failed")]
    SendRequest(#[source] reqwest::Error),

    #[error("Server returns error: {status} - {body}")]
    Rejected { status: String, body: String },
}

/// 指向某个服务器的传输客户端
#[derive(Debug, Clone)]
pub struct TransferClient {
    server: String,
    http: reqwest::Client,
}

impl TransferClient {
    /// `server` 为 `host:port` 形式
    pub fn new(server: impl Into<String>) -> Result<Self, ClientError> {
        // 不读取代理环境变量
        let http = reqwest::Client::builder()
            .no_proxy()
            .build()
            .map_err(ClientError::Init)?;

        Ok(Self {
            server: server.into(),
            http,
        })
    }

    /// 由主机和端口创建
    pub fn with_host(host: &str, port: u16) -> Result<Self, ClientError> {
        Self::new(format!("{host}:{port}"))
    }

    pub fn server(&self) -> &str {
        &self.server
    }
}
