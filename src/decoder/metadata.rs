//! NCM 元数据解码器。
//!
//! 元数据损坏不会中断解密：音频数据可以独立恢复，
//! 所以这里的任何失败都会被记录并替换为默认元数据。

use tracing::{debug, warn};

use crate::{
    crypto::{META_KEY, aes_ecb_decrypt, base64_decode, unpad},
    error::{NcmError, Result},
    model::Metadata,
};

/// Base64 解码前需要丢弃的前缀长度
pub const META_ENCODED_PREFIX_LEN: usize = 22;

/// 解密去填充后需要丢弃的前缀长度
pub const META_PLAIN_PREFIX_LEN: usize = 6;

/// 从已撤销白化的元数据块中解码元数据，失败时返回默认值。
pub fn decode_metadata(meta_block: &[u8]) -> Metadata {
    match try_decode_metadata(meta_block) {
        Ok(metadata) => {
            debug!(format = %metadata.format, "元数据解析成功");
            metadata
        }
        Err(e) => {
            warn!("元数据解析失败，使用默认值: {e}");
            Metadata::default()
        }
    }
}

/// 从已撤销白化的元数据块中解码元数据。
///
/// 丢弃 22 字节前缀，按 UTF-8 解码后做 Base64 解码，用 `META_KEY` 解密并去填充，
/// 再丢弃 6 字节前缀，最后将剩余文本解析为 JSON。
///
/// # 错误
/// * `NcmError::MetadataCorrupt` - 链条中任一步骤失败，内含具体原因。
pub fn try_decode_metadata(meta_block: &[u8]) -> Result<Metadata> {
    decode_chain(meta_block).map_err(|e| match e {
        NcmError::MetadataCorrupt(_) => e,
        other => NcmError::MetadataCorrupt(other.to_string()),
    })
}

fn decode_chain(meta_block: &[u8]) -> Result<Metadata> {
    let encoded = meta_block.get(META_ENCODED_PREFIX_LEN..).ok_or_else(|| {
        NcmError::MetadataCorrupt(format!("元数据块过短: {} 字节", meta_block.len()))
    })?;
    let encoded = String::from_utf8(encoded.to_vec())?;

    let ciphertext = base64_decode(encoded.trim())?;
    let decrypted = aes_ecb_decrypt(&ciphertext, &META_KEY)?;
    let unpadded = unpad(&decrypted);

    let json_bytes = unpadded.get(META_PLAIN_PREFIX_LEN..).ok_or_else(|| {
        NcmError::MetadataCorrupt(format!("解密后的元数据过短: {} 字节", unpadded.len()))
    })?;
    let json_text = String::from_utf8_lossy(json_bytes);

    Ok(serde_json::from_str(&json_text)?)
}
