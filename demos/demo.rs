//! 用于演示 `ncm-helper` 库的核心功能。
//!
//! ## 如何运行
//!
//! ```bash
//! cargo run --package ncm_helper_rs --example demo -- path/to/song.ncm
//! ```
//!
//! 参数可以是单个 `.ncm` 文件，也可以是包含 `.ncm` 文件的目录。

use std::path::PathBuf;

use ncm_helper_rs::{NcmHelper, Result, config};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Some(target) = std::env::args().nth(1).map(PathBuf::from) else {
        error!("用法: demo <文件或目录>");
        return Ok(());
    };

    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            warn!("无法加载配置，将使用默认配置: {e}");
            Default::default()
        }
    };
    info!("当前配置: {:?}", config);
    let helper = NcmHelper::with_config(config);

    if target.is_dir() {
        let results = helper.convert_directory(&target).await?;
        let succeeded = results.iter().filter(|(_, r)| r.is_ok()).count();
        info!("批量转换完成: {}/{} 个文件成功。", succeeded, results.len());
        return Ok(());
    }

    let outcome = helper.convert_file(&target).await?;
    let metadata = &outcome.audio.metadata;
    info!(
        "转换成功: '{}' - '{}' -> {}",
        metadata.music_name.as_deref().unwrap_or("未知歌曲"),
        metadata.artist.as_deref().unwrap_or_default().join(", "),
        outcome.audio.path.display()
    );
    if let Some(cover_path) = outcome.cover_path {
        info!("封面已保存到 {}", cover_path.display());
    }

    Ok(())
}
