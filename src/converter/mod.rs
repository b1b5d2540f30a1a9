//! 文件转换模块
//!
//! 在解密核心之上提供输出文件名、MIME 类型的选择，以及文件级别的读写。

pub mod batch;
pub mod types;

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use tracing::{debug, warn};

pub use types::{AudioFormat, ConvertedFile, FALLBACK_MIME_TYPE, WrittenFile};

use crate::{decoder::decrypt_ncm, error::Result, model::metadata::DEFAULT_FORMAT};

#[cfg(not(target_arch = "wasm32"))]
use crate::error::NcmError;

/// 根据格式名返回 MIME 类型，不区分大小写，无法识别时返回 `application/octet-stream`。
#[must_use]
pub fn mime_type_for(format: &str) -> &'static str {
    format
        .parse::<AudioFormat>()
        .map_or(FALLBACK_MIME_TYPE, AudioFormat::mime_type)
}

/// 根据输入路径和格式生成输出文件名。
///
/// 取路径（`/` 或 `\` 分隔）的最后一段，截取第一个 `.` 之前的部分作为基础名，
/// 为空时使用 `"output"`。
#[must_use]
pub fn output_file_name(input_path: &str, format: &str) -> String {
    let base_name = input_path
        .rsplit(['/', '\\'])
        .next()
        .and_then(|name| name.split('.').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("output");
    format!("{base_name}.{format}")
}

/// 判断格式名能否直接用作文件扩展名：非空且只包含 ASCII 字母和数字。
#[must_use]
pub fn is_plain_extension(format: &str) -> bool {
    !format.is_empty() && format.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// 选择输出格式：优先使用指定格式，其次是元数据中的格式。
///
/// 不能作为扩展名的格式会被跳过，都不可用时回退到 `mp3`。
fn select_output_format(output_format: Option<&str>, metadata_format: &str) -> String {
    for candidate in output_format.into_iter().chain(std::iter::once(metadata_format)) {
        if is_plain_extension(candidate) {
            return candidate.to_string();
        }
        if !candidate.is_empty() {
            warn!(format = %candidate, "格式名不能用作扩展名，已忽略");
        }
    }
    DEFAULT_FORMAT.to_string()
}

/// 解密内存中的 NCM 数据，并确定输出文件名与 MIME 类型。
///
/// # 参数
/// * `data` - NCM 文件的原始字节。
/// * `input_name` - 输入文件名或路径，用于生成输出文件名。
/// * `output_format` - 强制使用的输出格式。为 `None` 时使用元数据中的格式。
pub fn convert_ncm_bytes(
    data: &[u8],
    input_name: &str,
    output_format: Option<&str>,
) -> Result<ConvertedFile> {
    let result = decrypt_ncm(data)?;

    let format = select_output_format(output_format, &result.metadata.format);

    let file_name = output_file_name(input_name, &format);
    let mime_type = mime_type_for(&format);
    debug!(%file_name, mime_type, "已确定输出文件");

    Ok(ConvertedFile {
        data: result.audio_data,
        file_name,
        mime_type,
        metadata: result.metadata,
    })
}

/// 读取一个 NCM 文件，解密后写入输出目录。
///
/// # 参数
/// * `input` - NCM 文件路径。
/// * `output_dir` - 输出目录，为 `None` 时写入输入文件所在目录。不存在时会被创建。
/// * `output_format` - 强制使用的输出格式。
#[cfg(not(target_arch = "wasm32"))]
pub async fn convert_ncm_file(
    input: &Path,
    output_dir: Option<&Path>,
    output_format: Option<String>,
) -> Result<WrittenFile> {
    let data = tokio::fs::read(input).await?;
    let input_name = input.to_string_lossy().into_owned();

    let converted = tokio::task::spawn_blocking(move || {
        convert_ncm_bytes(&data, &input_name, output_format.as_deref())
    })
    .await
    .map_err(|e| NcmError::Internal(format!("解密任务异常退出: {e}")))??;

    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    tokio::fs::create_dir_all(&output_dir).await?;

    let path = output_dir.join(&converted.file_name);
    tokio::fs::write(&path, &converted.data).await?;
    debug!(path = %path.display(), len = converted.data.len(), "音频已写入");

    Ok(WrittenFile {
        path,
        mime_type: converted.mime_type,
        metadata: converted.metadata,
    })
}
