//! NCM 容器解析器。
//!
//! 文件结构（所有长度字段均为小端序 `u32`）：
//!
//! | 字段 | 大小 | 说明 |
//! |---|---|---|
//! | 魔数 | 8 | `CTENFDAM` |
//! | 未使用 | 2 | 跳过 |
//! | 密钥块 | 4 + n | 异或 `0x64` 后用 `CORE_KEY` 解密 |
//! | 元数据块 | 4 + n | 异或 `0x63` 后交给元数据解码器 |
//! | CRC + 保留 | 4 + 5 | 跳过，不校验 |
//! | 封面 | 4 + n | 跳过 |
//! | 音频 | 剩余部分 | 使用流密码掩码异或 |

pub mod reader;

use tracing::{debug, trace};

use crate::{
    crypto::{CORE_KEY, KeyBox, aes_ecb_decrypt, unpad},
    error::{NcmError, Result},
};

pub use reader::ByteReader;

/// NCM 文件魔数 (`4354454e4644414d`)
pub const NCM_MAGIC: &[u8; 8] = b"CTENFDAM";

/// 密钥块的异或白化字节
pub const KEY_WHITENING_BYTE: u8 = 0x64;

/// 元数据块的异或白化字节
pub const META_WHITENING_BYTE: u8 = 0x63;

/// 密钥块解密去填充后需要丢弃的前缀长度
pub const KEY_PREFIX_LEN: usize = 17;

const VERSION_FIELD_LEN: usize = 2;
const CRC_LEN: usize = 4;
const RESERVED_LEN: usize = 5;

/// 解析后的 NCM 容器，所有块都借用或派生自同一个输入缓冲区。
#[derive(Debug)]
pub struct NcmContainer<'a> {
    /// 由真实密钥派生的置换表
    pub key_box: KeyBox,
    /// 已撤销白化的元数据块
    pub meta_block: Vec<u8>,
    /// 被跳过的封面数据长度
    pub cover_len: usize,
    /// 音频块在文件中的起始偏移
    pub audio_offset: usize,
    /// 仍处于加密状态的音频块
    pub audio: &'a [u8],
}

impl<'a> NcmContainer<'a> {
    /// 按顺序解析整个容器，遇到任何不符合预期的情况立即失败。
    ///
    /// # 错误
    /// * `NcmError::InvalidHeader` - 魔数不匹配。
    /// * `NcmError::TruncatedContainer` - 任一长度字段超过剩余数据。
    /// * `NcmError::Cipher` - 密钥块无法解密或过短。
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);

        if !has_ncm_magic(data) {
            return Err(NcmError::InvalidHeader);
        }
        reader.skip(NCM_MAGIC.len(), "文件头")?;
        reader.skip(VERSION_FIELD_LEN, "版本字段")?;

        let key_block = reader.read_length_prefixed("密钥块")?;
        trace!(len = key_block.len(), "读取密钥块");
        let actual_key = recover_key(key_block)?;
        let key_box = KeyBox::new(&actual_key)?;

        let meta_block = reader.read_length_prefixed("元数据块")?;
        trace!(len = meta_block.len(), "读取元数据块");
        let meta_block = xor_whitening(meta_block, META_WHITENING_BYTE);

        reader.skip(CRC_LEN, "CRC")?;
        reader.skip(RESERVED_LEN, "保留字段")?;

        let cover_len = reader.read_u32_le("封面长度")? as usize;
        reader.skip(cover_len, "封面")?;

        let audio_offset = reader.offset();
        let audio = reader.read_rest();
        debug!(
            meta_len = meta_block.len(),
            cover_len,
            audio_offset,
            audio_len = audio.len(),
            "NCM 容器解析完成"
        );

        Ok(Self {
            key_box,
            meta_block,
            cover_len,
            audio_offset,
            audio,
        })
    }
}

/// 检查缓冲区是否以 NCM 魔数开头。
#[must_use]
pub fn has_ncm_magic(data: &[u8]) -> bool {
    data.starts_with(NCM_MAGIC)
}

/// 从白化的密钥块中恢复真实的流密码密钥。
///
/// 异或 `0x64`，用 `CORE_KEY` 解密，去填充，再丢弃 17 字节前缀。
pub fn recover_key(key_block: &[u8]) -> Result<Vec<u8>> {
    let ciphertext = xor_whitening(key_block, KEY_WHITENING_BYTE);
    let decrypted = aes_ecb_decrypt(&ciphertext, &CORE_KEY)?;
    let unpadded = unpad(&decrypted);

    match unpadded.get(KEY_PREFIX_LEN..) {
        Some(actual_key) if !actual_key.is_empty() => Ok(actual_key.to_vec()),
        _ => Err(NcmError::Cipher(format!(
            "密钥块过短: 去填充后只有 {} 字节",
            unpadded.len()
        ))),
    }
}

/// 对整个块异或同一个字节。
fn xor_whitening(block: &[u8], whitening: u8) -> Vec<u8> {
    block.iter().map(|byte| byte ^ whitening).collect()
}


#[cfg(test)]
mod tests {
    use super::fixture;
    use super::*;

    const ACTUAL_KEY: &[u8] = b"117185373617E7fT2VzxaQG3NhiGCw7GJ5iO";

    #[test]
    fn test_parse_valid_container() {
        let data = fixture::build(ACTUAL_KEY, br#"{"format":"mp3"}"#, b"\xff\xd8cover", b"audio");

        let container = NcmContainer::parse(&data).unwrap();

        assert_eq!(container.key_box, KeyBox::new(ACTUAL_KEY).unwrap());
        assert_eq!(container.cover_len, 7);
        assert_eq!(container.audio.len(), 5);
        assert_eq!(container.audio_offset, data.len() - 5);
        assert!(container.meta_block.starts_with(fixture::META_ENCODED_PREFIX));
    }

    #[test]
    fn test_recover_key() {
        assert_eq!(recover_key(&fixture::key_block(ACTUAL_KEY)).unwrap(), ACTUAL_KEY);
    }

    #[test]
    fn test_wrong_magic_is_invalid_header() {
        let mut data = fixture::build(ACTUAL_KEY, b"{}", b"", b"x");
        data[0] = b'X';
        assert!(matches!(NcmContainer::parse(&data), Err(NcmError::InvalidHeader)));
        assert!(matches!(NcmContainer::parse(b"CTEN"), Err(NcmError::InvalidHeader)));
        assert!(matches!(NcmContainer::parse(&[]), Err(NcmError::InvalidHeader)));
    }

    #[test]
    fn test_key_length_exceeding_buffer_is_truncated() {
        let mut data = NCM_MAGIC.to_vec();
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 32]);

        assert!(matches!(
            NcmContainer::parse(&data),
            Err(NcmError::TruncatedContainer {
                context: "密钥块",
                needed: 1000,
                remaining: 32,
            })
        ));
    }

    #[test]
    fn test_missing_version_field_is_truncated() {
        assert!(matches!(
            NcmContainer::parse(b"CTENFDAM\x01"),
            Err(NcmError::TruncatedContainer { .. })
        ));
    }

    #[test]
    fn test_cover_length_exceeding_buffer_is_truncated() {
        let mut data = fixture::assemble(
            &fixture::key_block(ACTUAL_KEY),
            &fixture::meta_block(b"{}"),
            b"",
            b"",
        );
        let cover_len_pos = data.len() - 4;
        data[cover_len_pos..].copy_from_slice(&10u32.to_le_bytes());

        assert!(matches!(
            NcmContainer::parse(&data),
            Err(NcmError::TruncatedContainer { context: "封面", .. })
        ));
    }

    #[test]
    fn test_unaligned_key_block_is_cipher_error() {
        let mut key_block = fixture::key_block(ACTUAL_KEY);
        key_block.pop();
        let data = fixture::assemble(&key_block, b"", b"", b"");

        assert!(matches!(NcmContainer::parse(&data), Err(NcmError::Cipher(_))));
    }

    #[test]
    fn test_key_block_without_key_bytes_is_cipher_error() {
        let data = fixture::assemble(&fixture::key_block(b""), b"", b"", b"");
        assert!(matches!(NcmContainer::parse(&data), Err(NcmError::Cipher(_))));
    }

    #[test]
    fn test_empty_audio_block() {
        let data = fixture::build(ACTUAL_KEY, b"{}", b"", b"");
        let container = NcmContainer::parse(&data).unwrap();
        assert!(container.audio.is_empty());
    }
}
