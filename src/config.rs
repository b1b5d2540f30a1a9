//! 负责处理转换器的持久化配置。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::{cover::DEFAULT_USER_AGENT, error::Result};

const CONFIG_FILE_NAME: &str = "config.json";

/// 转换器的配置项。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConverterConfig {
    /// 输出目录。为 `None` 时写入输入文件所在的目录。
    pub output_dir: Option<PathBuf>,
    /// 强制使用的输出格式扩展名。为 `None` 时使用元数据中的格式。
    pub output_format: Option<String>,
    /// 转换后是否下载专辑封面。
    pub fetch_cover: bool,
    /// 下载封面时使用的 User-Agent。
    pub user_agent: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            output_format: None,
            fetch_cover: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// 获取应用配置目录下指定文件的完整路径。
///
/// # 参数
/// * `filename` - 目标配置文件的名称，例如 "config.json"。
pub(crate) fn get_config_file_path(filename: &str) -> Result<PathBuf> {
    if let Some(mut config_dir) = dirs::config_dir() {
        config_dir.push("ncm-helper");
        fs::create_dir_all(&config_dir)?;
        config_dir.push(filename);
        Ok(config_dir)
    } else {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "无法找到用户配置目录").into())
    }
}

/// 从用户配置目录加载配置，文件不存在时创建并保存默认配置。
pub fn load_config() -> Result<ConverterConfig> {
    let config_path = get_config_file_path(CONFIG_FILE_NAME)?;
    load_config_from(&config_path)
}

/// 将配置保存到用户配置目录。
pub fn save_config(config: &ConverterConfig) -> Result<()> {
    let config_path = get_config_file_path(CONFIG_FILE_NAME)?;
    save_config_to(config, &config_path)
}

/// 从指定路径加载配置，文件不存在时创建并保存默认配置。
pub fn load_config_from(path: &Path) -> Result<ConverterConfig> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let config: ConverterConfig = serde_json::from_str(&content)?;
            info!("已从 {} 加载配置。", path.display());
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("配置文件不存在，将创建默认配置。");
            let config = ConverterConfig::default();
            save_config_to(&config, path)?;
            Ok(config)
        }
        Err(e) => Err(e.into()),
    }
}

/// 将配置序列化为 JSON 并保存到指定路径。
pub fn save_config_to(config: &ConverterConfig, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    info!("配置已保存到 {}。", path.display());
    Ok(())
}
