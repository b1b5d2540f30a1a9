//! 专辑封面下载。
//!
//! NCM 文件内嵌的封面会被解密流程跳过，元数据中的 `albumPic` 地址是获取封面的途径。

use async_trait::async_trait;
use reqwest::{Client, header::USER_AGENT};
use tracing::{debug, instrument};

use crate::error::{NcmError, Result};

/// 下载封面时默认使用的桌面浏览器 User-Agent
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// 根据地址获取封面图片的数据源。
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait CoverFetcher: Send + Sync {
    /// 下载封面图片的原始字节。
    async fn fetch_cover(&self, url: &str) -> Result<Vec<u8>>;
}

/// 基于 `reqwest` 的封面下载器。
#[derive(Debug, Clone)]
pub struct HttpCoverFetcher {
    http_client: Client,
    user_agent: String,
}

impl HttpCoverFetcher {
    /// 使用指定的 User-Agent 创建下载器。
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            user_agent: user_agent.into(),
        }
    }
}

impl Default for HttpCoverFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl CoverFetcher for HttpCoverFetcher {
    #[instrument(skip(self))]
    async fn fetch_cover(&self, url: &str) -> Result<Vec<u8>> {
        if url.trim().is_empty() {
            return Err(NcmError::CoverDownload("封面地址为空".into()));
        }

        let response = self
            .http_client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NcmError::CoverDownload(format!("服务器返回状态码 {status}")));
        }

        let bytes = response.bytes().await?;
        debug!(len = bytes.len(), "封面下载完成");
        Ok(bytes.to_vec())
    }
}

/// 根据文件头识别常见的图片格式，返回 MIME 类型。
#[must_use]
pub fn detect_image_mime(data: &[u8]) -> Option<&'static str> {
    if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if data.starts_with(b"GIF8") {
        Some("image/gif")
    } else {
        None
    }
}

/// 根据图片数据选择保存封面时使用的扩展名，无法识别时使用 `jpg`。
#[must_use]
pub fn image_extension(data: &[u8]) -> &'static str {
    match detect_image_mime(data) {
        Some("image/png") => "png",
        Some("image/gif") => "gif",
        _ => "jpg",
    }
}
