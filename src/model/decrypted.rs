//! 定义了解密入口的输出结构。

use serde::Serialize;

use crate::model::metadata::Metadata;

/// 一次解密调用的唯一输出，构造后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedResult {
    /// 解密后的原始音频数据（MP3/FLAC 等）。
    #[serde(skip)]
    pub audio_data: Vec<u8>,
    /// 从元数据块恢复的元数据，损坏时为默认值。
    pub metadata: Metadata,
    /// 封面图片的远程地址，取自 `metadata.album_pic`。
    pub cover_url: Option<String>,
}

impl DecryptedResult {
    /// 音频格式的扩展名，例如 `"mp3"`、`"flac"`。
    #[must_use]
    pub fn format(&self) -> &str {
        &self.metadata.format
    }
}
