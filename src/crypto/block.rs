//! AES-128-ECB 解密单元。
//!
//! NCM 的密钥块和元数据块均使用固定密钥的 AES-128-ECB 加密。
//! 解密时在密码层关闭填充，之后由 [`unpad`] 手动移除填充。

use aes::{
    Aes128,
    cipher::{BlockSizeUser, generic_array::GenericArray},
};
use block_padding::NoPadding;
use cipher::{BlockDecryptMut, KeyInit};
use ecb::Decryptor as EcbModeDecryptor;

use crate::error::{NcmError, Result};

/// 用于解密密钥块的 AES 核心密钥 (`687A4852416D736F356B496E62617857`)
pub const CORE_KEY: [u8; 16] = *b"hzHRAmso5kInbaxW";

/// 用于解密元数据块的 AES 密钥 (`2331346C6A6B5F215C5D2630553C2728`)
pub const META_KEY: [u8; 16] = *br"#14ljk_!\]&0U<'(";

/// AES 分组大小（字节）
pub const AES_BLOCK_SIZE: usize = 16;

/// 以 ECB 模式执行 AES-128 解密，不移除填充。
///
/// # 参数
/// * `ciphertext` - 密文，长度必须是 16 的倍数。
/// * `key` - AES 密钥，必须恰好 16 字节。
///
/// # 返回
/// - `Result<Vec<u8>>`: 与输入等长的明文。
///
/// # 错误
/// * `NcmError::Cipher` - 密钥长度不是 16 字节，或密文长度未按块对齐。
pub fn aes_ecb_decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let block_size = Aes128::block_size();
    if key.len() != block_size {
        return Err(NcmError::Cipher(format!(
            "AES 密钥长度必须为 {} 字节，但实际为 {}",
            block_size,
            key.len()
        )));
    }
    if !ciphertext.len().is_multiple_of(block_size) {
        return Err(NcmError::Cipher(format!(
            "密文长度 {} 不是分组大小 {} 的倍数",
            ciphertext.len(),
            block_size
        )));
    }

    let key_ga = GenericArray::from_slice(key);
    let cipher = EcbModeDecryptor::<Aes128>::new(key_ga);

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_padded_mut::<NoPadding>(&mut buffer)
        .map_err(|e| NcmError::Cipher(format!("AES ECB 解密失败: {e:?}")))?;

    Ok(buffer)
}

/// 宽松的去填充策略。
///
/// 读取最后一个字节作为填充长度 `n`，若 `1 <= n <= 16` 则丢弃末尾 `n` 个字节，
/// 否则原样返回。不校验填充字节本身的取值，元数据块并不总是严格按 PKCS#7 填充。
#[must_use]
pub fn unpad(data: &[u8]) -> &[u8] {
    match data.last() {
        Some(&padding) => {
            let padding = padding as usize;
            if (1..=AES_BLOCK_SIZE).contains(&padding) && padding <= data.len() {
                &data[..data.len() - padding]
            } else {
                data
            }
        }
        None => data,
    }
}

/// 测试用的 AES-128-ECB 加密（PKCS#7 填充），用于构造合成数据。
#[cfg(test)]
pub(crate) fn aes_ecb_encrypt(plaintext: &[u8], key: &[u8]) -> Vec<u8> {
    use block_padding::Pkcs7;
    use cipher::BlockEncryptMut;
    use ecb::Encryptor as EcbModeEncryptor;

    let cipher = EcbModeEncryptor::<Aes128>::new(GenericArray::from_slice(key));
    let msg_len = plaintext.len();
    let padded_len = (msg_len / AES_BLOCK_SIZE + 1) * AES_BLOCK_SIZE;
    let mut buffer = plaintext.to_vec();
    buffer.resize(padded_len, 0);
    cipher
        .encrypt_padded_mut::<Pkcs7>(&mut buffer, msg_len)
        .expect("缓冲区已预留填充空间")
        .to_vec()
}
