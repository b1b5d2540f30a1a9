//! 宿主与解密核心之间的转换消息。
//!
//! 请求与响应都可以直接序列化为 JSON，字节数组表示为数字数组，
//! 便于通过扩展消息或其他不支持二进制的通道传递。

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{decoder::decrypt_ncm, model::Metadata};

/// 转换请求。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    /// NCM 文件的原始字节
    pub file_data: Vec<u8>,
    /// 原始文件名
    pub file_name: String,
}

/// 转换响应。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    /// 是否成功
    pub success: bool,
    /// 解密后的音频数据
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<Vec<u8>>,
    /// 元数据
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// 失败原因
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 处理一个转换请求。
///
/// 不会返回错误：任何失败都会被转换为 `success: false` 的响应。
pub fn handle_convert(request: &ConvertRequest) -> ConvertResponse {
    match decrypt_ncm(&request.file_data) {
        Ok(result) => {
            info!(file_name = %request.file_name, "转换请求处理成功");
            ConvertResponse {
                success: true,
                audio_data: Some(result.audio_data),
                metadata: Some(result.metadata),
                error: None,
            }
        }
        Err(e) => {
            warn!(file_name = %request.file_name, "转换请求处理失败: {e}");
            ConvertResponse {
                success: false,
                error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}
