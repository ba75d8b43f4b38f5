//! 服务器配置
//!
//! 配置只来自命令行参数，在启动时校验一次，之后在进程生命周期内不可变。

use axum::http::Version;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// 默认监听端口
pub const DEFAULT_PORT: u16 = 8000;
/// 默认服务目录
pub const DEFAULT_DIRECTORY: &str = ".";
/// 默认协议版本
pub const DEFAULT_PROTOCOL: &str = "HTTP/1.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error accessing directory {path:?}: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedProtocol(String),
}

/// 对外声明的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpProtocol {
    #[default]
    Http10,
    Http11,
}

impl HttpProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpProtocol::Http10 => "HTTP/1.0",
            HttpProtocol::Http11 => "HTTP/1.1",
        }
    }

    /// 对应的 `http::Version`
    pub fn version(&self) -> Version {
        match self {
            HttpProtocol::Http10 => Version::HTTP_10,
            HttpProtocol::Http11 => Version::HTTP_11,
        }
    }
}

impl FromStr for HttpProtocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP/1.0" => Ok(HttpProtocol::Http10),
            "HTTP/1.1" => Ok(HttpProtocol::Http11),
            other => Err(ConfigError::UnsupportedProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for HttpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 服务器设置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 绑定地址（`None` 表示所有网卡）
    pub bind: Option<String>,
    pub port: u16,
    /// 服务目录
    pub root: PathBuf,
    pub protocol: HttpProtocol,
}

impl ServerConfig {
    /// 校验并创建配置
    ///
    /// 先检查目录，再检查协议版本；任何一项失败都不会绑定端口。
    pub fn new(
        bind: Option<String>,
        port: u16,
        root: impl Into<PathBuf>,
        protocol: &str,
    ) -> Result<Self, ConfigError> {
        let root = root.into();

        let meta = std::fs::metadata(&root).map_err(|source| ConfigError::Inaccessible {
            path: root.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(ConfigError::NotADirectory(root));
        }

        let protocol = protocol.parse()?;

        Ok(Self {
            bind: bind.filter(|b| !b.is_empty()),
            port,
            root,
            protocol,
        })
    }

    /// 监听地址，未指定绑定地址时监听所有网卡
    pub fn listen_addr(&self) -> String {
        match &self.bind {
            Some(bind) => format!("{}:{}", bind, self.port),
            None => format!("0.0.0.0:{}", self.port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::new(None, 9000, dir.path(), "HTTP/1.1").unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.root, dir.path());
        assert_eq!(config.protocol, HttpProtocol::Http11);
        assert_eq!(config.listen_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_bind_address() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            ServerConfig::new(Some("127.0.0.1".into()), 8000, dir.path(), "HTTP/1.0").unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:8000");

        // 空字符串等同于未指定
        let config = ServerConfig::new(Some(String::new()), 8000, dir.path(), "HTTP/1.0").unwrap();
        assert_eq!(config.bind, None);
    }

    #[test]
    fn test_regular_file_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ServerConfig::new(None, 8000, file.path(), "HTTP/1.0").unwrap_err();
        assert!(matches!(err, ConfigError::NotADirectory(_)), "{err}");
    }

    #[test]
    fn test_missing_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = ServerConfig::new(None, 8000, &missing, "HTTP/1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Inaccessible { .. }), "{err}");
    }

    #[test]
    fn test_unsupported_protocol_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for proto in ["HTTP/2", "http/1.1", "HTTP/1.1 ", ""] {
            let err = ServerConfig::new(None, 8000, dir.path(), proto).unwrap_err();
            assert!(
                matches!(err, ConfigError::UnsupportedProtocol(_)),
                "{proto:?}: {err}"
            );
        }
    }

    #[test]
    fn test_protocol_versions() {
        assert_eq!(HttpProtocol::default(), HttpProtocol::Http10);
        assert_eq!(HttpProtocol::Http10.version(), Version::HTTP_10);
        assert_eq!(HttpProtocol::Http11.version(), Version::HTTP_11);
        assert_eq!(
            DEFAULT_PROTOCOL.parse::<HttpProtocol>().unwrap().to_string(),
            "HTTP/1.0"
        );
    }
}
