//! 定义了 NCM 元数据块中 JSON 对应的数据结构。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// 元数据缺失或损坏时使用的音频格式
pub const DEFAULT_FORMAT: &str = "mp3";

fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

/// NCM 文件中嵌入的歌曲元数据。
///
/// 只有 `format` 和 `albumPic` 总是存在，其他已知字段可选，
/// 未知字段（如 `musicId`、`bitrate`、`duration`）原样保存在 `extra` 中。
///
/// 已知字段按字段宽松解析：某个字段类型不符时只回退该字段的默认值，
/// 不会丢弃整条元数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// 音频格式，例如 `"mp3"`、`"flac"`。
    #[serde(default = "default_format", deserialize_with = "deserialize_format")]
    pub format: String,
    /// 专辑封面的远程地址，可能为空字符串。
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub album_pic: String,
    /// 歌曲名。
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub music_name: Option<String>,
    /// 艺术家列表，保持原有顺序。
    #[serde(
        default,
        deserialize_with = "deserialize_artists",
        skip_serializing_if = "Option::is_none"
    )]
    pub artist: Option<Vec<String>>,
    /// 专辑名。
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub album: Option<String>,
    /// 其余未建模的字段。
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            format: default_format(),
            album_pic: String::new(),
            music_name: None,
            artist: None,
            album: None,
            extra: Map::new(),
        }
    }
}

/// 把标量 JSON 值转换为文本，数字和布尔值按其字面形式保留。
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn deserialize_format<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(format) => format,
        _ => default_format(),
    })
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// 艺术家可能是字符串列表、客户端实际写入的 `[名字, ID]` 二元组列表，
/// 也可能是单个字符串。所有形式都只保留名字，其他类型视为缺失。
fn deserialize_artists<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(name) => Some(vec![name]),
        Value::Array(entries) => Some(
            entries
                .into_iter()
                .filter_map(|entry| match entry {
                    Value::Array(mut parts) if !parts.is_empty() => {
                        scalar_text(parts.swap_remove(0))
                    }
                    other => scalar_text(other),
                })
                .collect(),
        ),
        _ => None,
    })
}
