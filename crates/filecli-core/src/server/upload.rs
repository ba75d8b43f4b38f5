//! 文件上传接口
//!
//! - `POST /upload`: multipart 表单，文件字段 `file`（必填），文本字段 `dest`
//!   （可选，保存的文件名）
//! - `GET /upload-form`: 上传表单页面
//!
//! 文件内容先流式写入服务目录下的临时文件，读完整个表单后再重命名为目标文件，
//! 因此 `dest` 字段可以出现在文件字段之后。非文件字段在内存中缓冲，总量不超过
//! [`MAX_FORM_MEMORY`]。

use log::{error, info, warn};

use crate::config::ServerConfig;
use axum::{
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// 非文件字段的内存缓冲上限 (10 MiB)
pub const MAX_FORM_MEMORY: usize = 10 << 20;

const SPOOL_PREFIX: &str = ".filecli-upload-";

const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>File Upload</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
        .container { background-color: #f5f5f5; padding: 20px; border-radius: 8px; }
        h1 { color: #333; }
        .form-group { margin-bottom: 15px; }
        label { display: block; margin-bottom: 5px; font-weight: bold; }
        input[type="file"] { padding: 8px; }
        input[type="text"] { width: 100%; padding: 8px; box-sizing: border-box; }
        button { background-color: #4CAF50; color: white; padding: 10px 15px; border: none; border-radius: 4px; cursor: pointer; }
        button:hover { background-color: #45a049; }
    </style>
</head>
<body>
    <div class="container">
        <h1>File Upload</h1>
        <form action="/upload" method="post" enctype="multipart/form-data">
            <div class="form-group">
                <label for="file">Select File:</label>
                <input type="file" id="file" name="file" required>
            </div>
            <div class="form-group">
                <label for="dest">Save As (optional):</label>
                <input type="text" id="dest" name="dest" placeholder="Enter filename to save on server">
            </div>
            <button type="submit">Upload File</button>
        </form>
    </div>
</body>
</html>
"#;

/// 上传失败的原因，每种对应固定的状态码和响应文本
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Error parsing multipart form")]
    ParseForm(String),

    #[error("Error retrieving file")]
    MissingFile,

    #[error("Error creating file")]
    CreateFile(#[source] io::Error),

    #[error("Error saving file")]
    SaveFile(#[source] io::Error),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::ParseForm(_) | UploadError::MissingFile => StatusCode::BAD_REQUEST,
            UploadError::CreateFile(_) | UploadError::SaveFile(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 记录日志用的详细原因
    fn detail(&self) -> String {
        match self {
            UploadError::ParseForm(reason) => reason.clone(),
            UploadError::MissingFile => "no `file` part in form".to_string(),
            UploadError::CreateFile(e) | UploadError::SaveFile(e) => e.to_string(),
        }
    }
}

impl From<MultipartError> for UploadError {
    fn from(e: MultipartError) -> Self {
        UploadError::ParseForm(e.body_text())
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

pub async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub async fn upload_handler(
    State(config): State<Arc<ServerConfig>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            let e = UploadError::ParseForm(rejection.body_text());
            warn!("Rejected upload: {}: {}", e, e.detail());
            return e.into_response();
        }
    };

    match receive_upload(&config.root, multipart).await {
        Ok(dest_name) => {
            info!("File uploaded: {}", dest_name);
            (
                StatusCode::OK,
                format!("File uploaded successfully: {dest_name}"),
            )
                .into_response()
        }
        Err(e) => {
            if e.status().is_server_error() {
                error!("Upload failed: {}: {}", e, e.detail());
            } else {
                warn!("Rejected upload: {}: {}", e, e.detail());
            }
            e.into_response()
        }
    }
}

/// 读取整个表单并保存文件，返回目标文件名
async fn receive_upload(root: &Path, mut multipart: Multipart) -> Result<String, UploadError> {
    let mut spooled: Option<(NamedTempFile, String)> = None;
    let mut dest: Option<String> = None;
    let mut form_bytes = 0usize;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map(str::to_owned);

        match file_name {
            Some(file_name) if name == "file" && spooled.is_none() => {
                let tmp = spool_field(root, &mut field).await?;
                spooled = Some((tmp, base_name(&file_name).to_string()));
            }
            // 其他文件字段不保存
            Some(_) => {}
            None => {
                let value = read_text(&mut field, &mut form_bytes).await?;
                if name == "dest" && dest.is_none() {
                    dest = Some(value);
                }
            }
        }
    }

    let (tmp, original_name) = spooled.ok_or(UploadError::MissingFile)?;
    let dest_name = dest.filter(|d| !d.is_empty()).unwrap_or(original_name);
    let dest_path = destination_path(root, &dest_name);

    tmp.persist(&dest_path)
        .map_err(|e| UploadError::CreateFile(e.error))?;

    Ok(dest_name)
}

/// 将文件字段写入服务目录下的临时文件
async fn spool_field(root: &Path, field: &mut Field<'_>) -> Result<NamedTempFile, UploadError> {
    let tmp = spool_builder()
        .tempfile_in(root)
        .map_err(UploadError::CreateFile)?;
    let handle = tmp.reopen().map_err(UploadError::CreateFile)?;
    let mut file = tokio::fs::File::from_std(handle);

    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await.map_err(UploadError::SaveFile)?;
    }
    file.flush().await.map_err(UploadError::SaveFile)?;

    Ok(tmp)
}

fn spool_builder() -> tempfile::Builder<'static, 'static> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(SPOOL_PREFIX);

    // 与普通新建文件一致，而不是临时文件默认的 0600
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }

    builder
}

async fn read_text(field: &mut Field<'_>, form_bytes: &mut usize) -> Result<String, UploadError> {
    let mut buf = Vec::new();

    while let Some(chunk) = field.chunk().await? {
        *form_bytes += chunk.len();
        if *form_bytes > MAX_FORM_MEMORY {
            return Err(UploadError::ParseForm(
                "multipart: form fields too large".to_string(),
            ));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// 客户端文件名只保留最后一段
fn base_name(file_name: &str) -> &str {
    file_name.rsplit(['/', '\\']).next().unwrap_or(file_name)
}

/// 目标路径 = 服务目录 + 目标文件名
///
/// 开头的路径分隔符被去掉，绝对路径因此仍落在服务目录下；`..` 不做处理。
pub fn destination_path(root: &Path, dest_name: &str) -> PathBuf {
    root.join(dest_name.trim_start_matches(['/', '\\']))
}
