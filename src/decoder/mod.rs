//! 解密入口，将容器解析、密钥恢复、元数据解码和音频解密串联为一次调用。

pub mod metadata;

use tracing::{info, instrument, warn};

use crate::{
    container::NcmContainer,
    error::{NcmError, Result},
    model::DecryptedResult,
};

pub use metadata::decode_metadata;

/// 解密一个完整的 NCM 文件。
///
/// # 参数
/// * `data` - 整个 NCM 文件的原始字节。
///
/// # 返回
/// - `Result<DecryptedResult>`: 解密后的音频、元数据和封面地址。
///
/// # 错误
/// * `NcmError::DecryptionFailed` - 包装了 `InvalidHeader`、`TruncatedContainer`
///   或 `Cipher` 等致命错误。元数据错误不会出现在这里。
#[instrument(skip(data), fields(len = data.len()))]
pub fn decrypt_ncm(data: &[u8]) -> Result<DecryptedResult> {
    decrypt_inner(data).map_err(|e| {
        warn!("NCM 解密失败: {e}");
        NcmError::DecryptionFailed(Box::new(e))
    })
}

fn decrypt_inner(data: &[u8]) -> Result<DecryptedResult> {
    let container = NcmContainer::parse(data)?;
    let mask = container.key_box.mask();

    let metadata = decode_metadata(&container.meta_block);

    let mut audio_data = container.audio.to_vec();
    mask.apply(&mut audio_data);

    info!(
        format = %metadata.format,
        audio_len = audio_data.len(),
        "NCM 解密完成"
    );

    let cover_url = Some(metadata.album_pic.clone());
    Ok(DecryptedResult {
        audio_data,
        metadata,
        cover_url,
    })
}
