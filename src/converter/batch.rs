//! 批量转换时的文件发现。

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::Result;

/// NCM 文件的扩展名
pub const NCM_EXTENSION: &str = "ncm";

/// 扫描指定目录（不递归），返回所有扩展名为 `.ncm`（不区分大小写）的文件，按路径排序。
///
/// # 参数
/// * `input_dir` - 要扫描的输入目录路径。
///
/// # 错误
/// * `NcmError::Io` - 路径不是目录或无法读取。
pub fn discover_ncm_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "指定的输入路径不是一个目录或不存在",
        )
        .into());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() && is_ncm_path(&path) {
            files.push(path);
        }
    }
    files.sort();

    debug!(count = files.len(), dir = %input_dir.display(), "发现 NCM 文件");
    Ok(files)
}

/// 判断路径的扩展名是否为 `.ncm`。
#[must_use]
pub fn is_ncm_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NCM_EXTENSION))
}
