//! Filecli Core Library
//!
//! 简易文件传输工具的核心实现：静态文件 HTTP 服务器（附带上传接口）以及配套的
//! 上传/下载客户端。
//!
//! # 模块
//!
//! - **params**: 短/长选项的参数合并
//! - **config**: 服务器配置与启动校验
//! - **server**: 静态文件、上传接口、上传表单、访问日志
//! - **client**: HTTP 下载与 multipart 上传
//! - **logging**: 日志级别定义
//!
//! # 使用示例
//!
//! ## 启动服务器
//!
//! ```ignore
//! use filecli_core::{FileServer, ServerConfig};
//!
//! let config = ServerConfig::new(None, 8000, ".", "HTTP/1.0")?;
//! FileServer::bind(config).await?.serve().await?;
//! ```
//!
//! ## 上传与下载
//!
//! ```ignore
//! use filecli_core::TransferClient;
//!
//! let client = TransferClient::new("127.0.0.1:8000")?;
//! client.upload("notes.txt".as_ref(), None).await?;
//! client.download("notes.txt", None).await?;
//! ```

pub mod client;
pub mod config;
pub mod logging;
pub mod params;
pub mod server;

pub use client::{ClientError, TransferClient};
pub use config::{ConfigError, HttpProtocol, ServerConfig};
pub use logging::LogLevel;
pub use params::{OptionName, ParamError};
pub use server::FileServer;
