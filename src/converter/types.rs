//! 定义了转换流程中使用的核心数据类型。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};

use crate::model::Metadata;

/// 无法识别的格式所使用的 MIME 类型
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// 枚举：表示可识别的音频格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-1 Audio Layer III
    Mp3,
    /// Free Lossless Audio Codec
    Flac,
    /// Ogg 容器
    Ogg,
    /// MPEG-4 音频
    M4a,
    /// 波形音频
    Wav,
}

impl AudioFormat {
    /// 将音频格式枚举转换为对应的文件扩展名字符串。
    #[must_use]
    pub fn to_extension_str(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Flac => "flac",
            AudioFormat::Ogg => "ogg",
            AudioFormat::M4a => "m4a",
            AudioFormat::Wav => "wav",
        }
    }

    /// 返回该格式的 MIME 类型。
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Flac => "audio/flac",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::M4a => "audio/mp4",
            AudioFormat::Wav => "audio/wav",
        }
    }
}

/// 在内存中完成转换的文件。
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    /// 解密后的音频数据
    pub data: Vec<u8>,
    /// 输出文件名，例如 `"song.flac"`
    pub file_name: String,
    /// 输出文件的 MIME 类型
    pub mime_type: &'static str,
    /// 元数据
    pub metadata: Metadata,
}

/// 已写入磁盘的转换结果。
#[derive(Debug, Clone)]
pub struct WrittenFile {
    /// 音频文件的路径
    pub path: PathBuf,
    /// 输出文件的 MIME 类型
    pub mime_type: &'static str,
    /// 元数据
    pub metadata: Metadata,
}
