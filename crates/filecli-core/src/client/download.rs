use log::info;

use super::{ClientError, TransferClient};
use futures_util::TryStreamExt;
use reqwest::StatusCode;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

impl TransferClient {
    /// 下载远程文件
    ///
    /// `local_path` 为空时使用远程路径的最后一段作为文件名。只有在响应状态
    /// 为 200 之后才会创建本地文件。返回保存的路径。
    pub async fn download(
        &self,
        remote_path: &str,
        local_path: Option<&Path>,
    ) -> Result<PathBuf, ClientError> {
        let remote_path = normalize_remote_path(remote_path);
        let url = format!("http://{}{}", self.server, remote_path);
        info!("Downloading {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Connect)?;

        if response.status() != StatusCode::OK {
            return Err(ClientError::Status(response.status().to_string()));
        }

        let dest = match local_path {
            Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
            _ => PathBuf::from(remote_file_name(&remote_path)),
        };

        let mut file =
            tokio::fs::File::create(&dest)
                .await
                .map_err(|source| ClientError::CreateFile {
                    path: dest.clone(),
                    source,
                })?;

        let body = StreamReader::new(response.bytes_stream().map_err(io::Error::other));
        tokio::pin!(body);

        let written = tokio::io::copy(&mut body, &mut file)
            .await
            .map_err(ClientError::Download)?;
        file.flush().await.map_err(ClientError::Download)?;

        info!("Saved {} bytes to {:?}", written, dest);
        Ok(dest)
    }
}

/// 补全开头的 `/`
fn normalize_remote_path(remote_path: &str) -> String {
    if remote_path.starts_with('/') {
        remote_path.to_string()
    } else {
        format!("/{remote_path}")
    }
}

/// 远程路径的最后一段
fn remote_file_name(remote_path: &str) -> &str {
    remote_path.rsplit('/').next().unwrap_or(remote_path)
}
