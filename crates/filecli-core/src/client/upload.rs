use log::info;

use super::{ClientError, TransferClient};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tokio::io::AsyncReadExt;

impl TransferClient {
    /// 上传本地文件
    ///
    /// 表单包含文件字段 `file`（文件名为本地文件名）以及可选的 `dest`。
    /// 返回服务器的确认文本。
    pub async fn upload(
        &self,
        local_path: &Path,
        remote_name: Option<&str>,
    ) -> Result<String, ClientError> {
        let mut file =
            tokio::fs::File::open(local_path)
                .await
                .map_err(|source| ClientError::OpenFile {
                    path: local_path.to_path_buf(),
                    source,
                })?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .await
            .map_err(ClientError::ReadFile)?;

        let form = build_form(local_path, content, remote_name)?;

        let url = format!("http://{}/upload", self.server);
        info!("Uploading {:?} to {}", local_path, url);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::SendRequest)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            return Err(ClientError::Rejected {
                status: status.to_string(),
                body,
            });
        }

        Ok(body)
    }
}

fn build_form(
    local_path: &Path,
    content: Vec<u8>,
    remote_name: Option<&str>,
) -> Result<Form, ClientError> {
    let file_name = local_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = mime_guess::from_path(local_path).first_or_octet_stream();

    let part = Part::bytes(content)
        .file_name(file_name)
        .mime_str(mime.essence_str())
        .map_err(ClientError::BuildForm)?;

    let mut form = Form::new().part("file", part);
    if let Some(dest) = remote_name.filter(|d| !d.is_empty()) {
        form = form.text("dest", dest.to_string());
    }

    Ok(form)
}
