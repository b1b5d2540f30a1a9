#![warn(missing_docs)]

//! # NCM Helper RS
//!
//! 一个用于解密网易云音乐 NCM 加密音频容器的 Rust 库。
//!
//! ## 主要功能
//!
//! - **解密**: 校验文件头，恢复被 AES-128-ECB 保护的音频密钥，
//!   用 RC4 风格的掩码解密音频数据，并尽力恢复内嵌的 JSON 元数据。
//! - **转换**: 根据元数据选择输出文件名和 MIME 类型，将音频写入磁盘。
//! - **封面**: 通过元数据中的 `albumPic` 地址下载专辑封面。
//!
//! ## 解密内存中的数据
//!
//! ```rust,no_run
//! use ncm_helper_rs::decrypt_ncm;
//!
//! let data = std::fs::read("song.ncm").unwrap();
//! match decrypt_ncm(&data) {
//!     Ok(result) => println!(
//!         "解密成功！格式: {}，音频 {} 字节。",
//!         result.metadata.format,
//!         result.audio_data.len()
//!     ),
//!     Err(e) => eprintln!("解密失败: {}", e),
//! }
//! ```
//!
//! ## 转换文件
//!
//! ```rust,no_run
//! use ncm_helper_rs::NcmHelper;
//!
//! async {
//!     let helper = NcmHelper::new();
//!     let outcome = helper
//!         .convert_file(std::path::Path::new("song.ncm"))
//!         .await
//!         .unwrap();
//!     println!("已写入 {}", outcome.audio.path.display());
//! };
//! ```
pub mod config;
pub mod container;
pub mod converter;
pub mod cover;
pub mod crypto;
pub mod decoder;
pub mod error;
pub mod message;
pub mod model;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

pub use crate::{
    config::ConverterConfig,
    converter::{ConvertedFile, WrittenFile},
    cover::{CoverFetcher, HttpCoverFetcher},
    decoder::decrypt_ncm,
    error::{NcmError, Result},
    model::{DecryptedResult, Metadata},
};

// ==========================================================
//  顶层 API
// ==========================================================

/// 顶层客户端，封装了配置和封面下载器，为用户提供统一、简单的接口。
///
/// 这是与本库交互的主要入口点。解密本身不依赖任何状态，
/// 也可以直接调用 [`decrypt_ncm`]。
pub struct NcmHelper {
    config: ConverterConfig,
    cover_fetcher: Box<dyn CoverFetcher>,
}

/// 单个文件转换的结果。
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    /// 已写入的音频文件
    pub audio: WrittenFile,
    /// 已写入的封面文件。未启用封面下载、地址为空或下载失败时为 `None`。
    pub cover_path: Option<std::path::PathBuf>,
}

impl Default for NcmHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl NcmHelper {
    /// 使用默认配置创建实例。
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    /// 使用指定配置创建实例，封面下载器使用配置中的 User-Agent。
    pub fn with_config(config: ConverterConfig) -> Self {
        let cover_fetcher = Box::new(HttpCoverFetcher::new(config.user_agent.clone()));
        Self {
            config,
            cover_fetcher,
        }
    }

    /// 替换封面下载器。
    #[must_use]
    pub fn with_cover_fetcher(mut self, cover_fetcher: impl CoverFetcher + 'static) -> Self {
        self.cover_fetcher = Box::new(cover_fetcher);
        self
    }

    /// 当前使用的配置。
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// 解密内存中的 NCM 数据。
    pub fn decrypt(&self, data: &[u8]) -> Result<DecryptedResult> {
        decrypt_ncm(data)
    }

    /// 解密内存中的 NCM 数据，并按配置确定输出文件名与 MIME 类型。
    pub fn convert(&self, data: &[u8], input_name: &str) -> Result<ConvertedFile> {
        converter::convert_ncm_bytes(data, input_name, self.config.output_format.as_deref())
    }

    /// 下载元数据中的专辑封面。地址为空时返回 `Ok(None)`，不会发出请求。
    pub async fn fetch_cover(&self, metadata: &Metadata) -> Result<Option<Vec<u8>>> {
        if metadata.album_pic.trim().is_empty() {
            return Ok(None);
        }
        self.cover_fetcher
            .fetch_cover(&metadata.album_pic)
            .await
            .map(Some)
    }

    /// 转换一个 NCM 文件并写入磁盘。
    ///
    /// 启用 `fetch_cover` 时会在音频旁边保存同名的封面图片。
    /// 封面下载失败只会记录警告，不会使转换失败。
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn convert_file(&self, input: &Path) -> Result<ConversionOutcome> {
        let audio = converter::convert_ncm_file(
            input,
            self.config.output_dir.as_deref(),
            self.config.output_format.clone(),
        )
        .await?;

        let cover_path = if self.config.fetch_cover {
            self.save_cover(&audio).await
        } else {
            None
        };

        Ok(ConversionOutcome { audio, cover_path })
    }

    /// 转换目录中的所有 NCM 文件（不递归）。
    ///
    /// 单个文件失败不会中断整个批次，每个文件的结果按路径顺序返回。
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn convert_directory(
        &self,
        input_dir: &Path,
    ) -> Result<Vec<(PathBuf, Result<ConversionOutcome>)>> {
        let files = converter::batch::discover_ncm_files(input_dir)?;
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let outcome = self.convert_file(&file).await;
            if let Err(e) = &outcome {
                tracing::warn!("转换 {} 失败: {e}", file.display());
            }
            results.push((file, outcome));
        }
        Ok(results)
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn save_cover(&self, audio: &WrittenFile) -> Option<PathBuf> {
        let cover = match self.fetch_cover(&audio.metadata).await {
            Ok(Some(cover)) => cover,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("封面下载失败: {e}");
                return None;
            }
        };

        let cover_path = audio
            .path
            .with_extension(crate::cover::image_extension(&cover));
        match tokio::fs::write(&cover_path, &cover).await {
            Ok(()) => Some(cover_path),
            Err(e) => {
                tracing::warn!("封面写入失败: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::container::fixture;
    use async_trait::async_trait;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn init_tracing() {
        use tracing_subscriber::{EnvFilter, FmtSubscriber};
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,ncm_helper_rs=debug"));
        let _ = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }

    /// 记录调用次数并返回固定 PNG 数据的封面下载器。
    #[derive(Clone, Default)]
    struct StaticCoverFetcher {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl CoverFetcher for StaticCoverFetcher {
        async fn fetch_cover(&self, _url: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(NcmError::CoverDownload("模拟失败".into()));
            }
            Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
        }
    }

    /// 测试结束（包括断言失败）时自动删除的临时目录。
    struct ScratchDir(PathBuf);

    impl std::ops::Deref for ScratchDir {
        type Target = Path;

        fn deref(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn temp_dir(name: &str) -> ScratchDir {
        let dir = std::env::temp_dir().join(format!("ncm-helper-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        ScratchDir(dir)
    }

    fn write_sample(dir: &Path, name: &str, album_pic: &str) -> PathBuf {
        let meta = format!(r#"{{"format":"flac","albumPic":"{album_pic}","musicName":"T"}}"#);
        let data = fixture::build(b"helper-key", meta.as_bytes(), b"", b"fLaC audio");
        let path = dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[tokio::test]
    async fn test_convert_file_with_cover() {
        init_tracing();
        let dir = temp_dir("cover");
        let input = write_sample(&dir, "Song.ncm", "http://example/x.jpg");
        let fetcher = StaticCoverFetcher::default();
        let calls = fetcher.calls.clone();

        let helper = NcmHelper::with_config(ConverterConfig {
            fetch_cover: true,
            ..Default::default()
        })
        .with_cover_fetcher(fetcher);

        let outcome = helper.convert_file(&input).await.unwrap();

        assert_eq!(outcome.audio.path, dir.join("Song.flac"));
        assert_eq!(outcome.cover_path, Some(dir.join("Song.png")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(std::fs::read(dir.join("Song.flac")).unwrap(), b"fLaC audio");
    }

    #[tokio::test]
    async fn test_cover_failure_does_not_fail_conversion() {
        init_tracing();
        let dir = temp_dir("cover-fail");
        let input = write_sample(&dir, "Song.ncm", "http://example/x.jpg");

        let helper = NcmHelper::with_config(ConverterConfig {
            fetch_cover: true,
            ..Default::default()
        })
        .with_cover_fetcher(StaticCoverFetcher {
            fail: true,
            ..Default::default()
        });

        let outcome = helper.convert_file(&input).await.unwrap();

        assert!(outcome.cover_path.is_none());
        assert!(outcome.audio.path.exists());
    }

    #[tokio::test]
    async fn test_empty_cover_url_skips_request() {
        let fetcher = StaticCoverFetcher::default();
        let calls = fetcher.calls.clone();
        let helper = NcmHelper::new().with_cover_fetcher(fetcher);

        let cover = helper.fetch_cover(&Metadata::default()).await.unwrap();

        assert!(cover.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_convert_directory_reports_each_file() {
        init_tracing();
        let dir = temp_dir("batch");
        write_sample(&dir, "good.ncm", "");
        std::fs::write(dir.join("bad.ncm"), b"not an ncm file").unwrap();

        let helper = NcmHelper::with_config(ConverterConfig {
            output_dir: Some(dir.join("out")),
            ..Default::default()
        });
        let results = helper.convert_directory(&dir).await.unwrap();

        assert_eq!(results.len(), 2);
        let (bad_path, bad) = &results[0];
        assert_eq!(bad_path, &dir.join("bad.ncm"));
        assert!(matches!(
            bad.as_ref().unwrap_err().root_cause(),
            NcmError::InvalidHeader
        ));
        let (_, good) = &results[1];
        assert_eq!(
            good.as_ref().unwrap().audio.path,
            dir.join("out").join("good.flac")
        );
    }

    #[test]
    fn test_scratch_dir_is_removed_on_drop() {
        let path = {
            let dir = temp_dir("drop");
            std::fs::write(dir.join("leftover.flac"), b"x").unwrap();
            dir.to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_convert_uses_configured_format() {
        let data = fixture::build(b"helper-key", br#"{"format":"flac"}"#, b"", b"x");
        let helper = NcmHelper::with_config(ConverterConfig {
            output_format: Some("mp3".into()),
            ..Default::default()
        });

        let converted = helper.convert(&data, "Song.ncm").unwrap();

        assert_eq!(converted.file_name, "Song.mp3");
    }
}
