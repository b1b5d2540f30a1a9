//! NCM 音频数据使用的流密码。
//!
//! 密钥编排与 RC4 的 KSA 相似，但之后并不生成连续的密钥流，
//! 而是从置换表推导出一张固定的 256 字节掩码，按偏移循环异或到整个音频数据上。
//! 因此任意字节都可以仅凭其绝对偏移独立解密。

use rayon::prelude::*;

use crate::error::{NcmError, Result};

/// 置换表与掩码的大小
pub const BOX_SIZE: usize = 256;

/// 超过该长度的数据会被分块并行处理
const PARALLEL_THRESHOLD: usize = 64 * 1024;

/// 并行处理时的分块大小，必须是 `BOX_SIZE` 的倍数
const PARALLEL_CHUNK_SIZE: usize = 16 * 1024;

/// 由密钥派生出的 256 字节置换表。
#[derive(Clone, PartialEq, Eq)]
pub struct KeyBox([u8; BOX_SIZE]);

impl KeyBox {
    /// RC4 风格的密钥编排。
    ///
    /// 对 `i` 从 0 到 255：`c = box[i] + last + key[key_offset]`（模 256），
    /// `key_offset` 在密钥中循环前进，交换 `box[i]` 与 `box[c]`，并令 `last = c`。
    ///
    /// # 错误
    /// * `NcmError::Cipher` - 密钥为空。
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(NcmError::Cipher("RC4 密钥不能为空".into()));
        }

        let mut key_box: [u8; BOX_SIZE] = std::array::from_fn(|i| i as u8);
        let mut last: u8 = 0;

        for (i, &key_byte) in key.iter().cycle().take(BOX_SIZE).enumerate() {
            let c = key_box[i].wrapping_add(last).wrapping_add(key_byte);
            key_box.swap(i, c as usize);
            last = c;
        }

        Ok(Self(key_box))
    }

    /// 置换表的只读视图。
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; BOX_SIZE] {
        &self.0
    }

    /// 推导 NCM 掩码。
    ///
    /// `j = i + 1`，`mask[i] = box[box[j] + box[box[j] + j]]`，所有下标模 256。
    #[must_use]
    pub fn mask(&self) -> NcmMask {
        let key_box = &self.0;
        NcmMask(std::array::from_fn(|i| {
            let j = (i + 1) & 0xff;
            let v1 = key_box[j] as usize;
            let v2 = key_box[(v1 + j) & 0xff] as usize;
            key_box[(v1 + v2) & 0xff]
        }))
    }
}

impl std::fmt::Debug for KeyBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyBox").finish_non_exhaustive()
    }
}

/// 循环作用于音频数据的 256 字节掩码。
#[derive(Clone, PartialEq, Eq)]
pub struct NcmMask([u8; BOX_SIZE]);

impl NcmMask {
    /// 掩码的只读视图。
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; BOX_SIZE] {
        &self.0
    }

    /// 对从音频块起点开始的数据原地异或掩码。
    pub fn apply(&self, data: &mut [u8]) {
        self.apply_at(data, 0);
    }

    /// 对一段数据原地异或掩码，`data[0]` 位于音频块内的绝对偏移 `offset` 处。
    ///
    /// 用于分块或流式解密：按任意切分处理得到的结果与一次处理整个缓冲区相同。
    pub fn apply_at(&self, data: &mut [u8], offset: usize) {
        if data.len() < PARALLEL_THRESHOLD {
            self.xor_chunk(data, offset);
            return;
        }

        data.par_chunks_mut(PARALLEL_CHUNK_SIZE)
            .enumerate()
            .for_each(|(index, chunk)| {
                self.xor_chunk(chunk, offset.wrapping_add(index * PARALLEL_CHUNK_SIZE));
            });
    }

    fn xor_chunk(&self, chunk: &mut [u8], offset: usize) {
        for (i, byte) in chunk.iter_mut().enumerate() {
            *byte ^= self.0[offset.wrapping_add(i) & 0xff];
        }
    }
}

impl std::fmt::Debug for NcmMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NcmMask").finish_non_exhaustive()
    }
}
