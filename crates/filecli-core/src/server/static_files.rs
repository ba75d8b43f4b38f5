//! 静态文件与目录列表
//!
//! 文件本身由 `tower_http::services::ServeDir` 提供（内容类型推断、目录重定向、
//! `index.html`、条件请求）。`ServeDir` 找不到文件时回退到这里：如果请求的是一个
//! 没有 `index.html` 的目录，则渲染简单的 HTML 列表，否则返回 404。

use log::error;

use crate::config::ServerConfig;
use axum::{
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// 链接中需要转义的字符
const HREF_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// 目录中的一项
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

pub async fn directory_listing(State(config): State<Arc<ServerConfig>>, uri: Uri) -> Response {
    let Some(dir) = resolve_request_path(&config.root, uri.path()) else {
        return not_found();
    };

    // 目录请求总以 `/` 结尾，否则 ServeDir 已经重定向
    if !uri.path().ends_with('/') {
        return not_found();
    }

    match tokio::fs::metadata(&dir).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return not_found(),
    }

    match read_entries(&dir).await {
        Ok(entries) => (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            render_listing(&entries),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to read directory {:?}: {}", dir, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error reading directory").into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 page not found").into_response()
}

/// 将 URI 路径映射到服务目录下的路径
///
/// 只接受普通路径段；包含 `..` 等成分的路径返回 `None`。
pub fn resolve_request_path(root: &Path, uri_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(uri_path).decode_utf8().ok()?;
    let mut path = root.to_path_buf();

    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => path.push(segment),
            _ => return None,
        }
    }

    Some(path)
}

async fn read_entries(dir: &Path) -> std::io::Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = read_dir.next_entry().await? {
        // 跟随符号链接判断是否为目录
        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// 渲染目录列表页面
pub fn render_listing(entries: &[ListingEntry]) -> String {
    let mut html = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );

    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        let href = utf8_percent_encode(&entry.name, HREF_ESCAPE);
        html.push_str(&format!(
            "<a href=\"{}{}\">{}{}</a>\n",
            href,
            suffix,
            escape_html(&entry.name),
            suffix
        ));
    }

    html.push_str("</pre>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
