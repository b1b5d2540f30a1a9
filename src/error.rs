//! 定义了整个 `ncm-helper` 库的错误类型 `NcmError`。

use std::{io, string::FromUtf8Error};
use thiserror::Error;

/// `ncm-helper` 库的通用错误枚举。
#[derive(Error, Debug)]
pub enum NcmError {
    /// 文件头魔数不匹配，输入不是 NCM 容器
    #[error("无效的 NCM 文件头")]
    InvalidHeader,

    /// 声明的块长度超过了剩余的缓冲区大小
    #[error("NCM 容器被截断: 读取{context}需要 {needed} 字节，但只剩余 {remaining} 字节")]
    TruncatedContainer {
        /// 正在读取的字段
        context: &'static str,
        /// 需要的字节数
        needed: usize,
        /// 实际剩余的字节数
        remaining: usize,
    },

    /// 密钥长度错误或密文未按块对齐
    #[error("分组密码错误: {0}")]
    Cipher(String),

    /// 元数据解码链中的任一步骤失败。
    ///
    /// 该错误只在元数据解码器内部使用，会被替换为默认元数据，不会从解密入口返回。
    #[error("元数据已损坏: {0}")]
    MetadataCorrupt(String),

    /// 解密入口统一包装的致命错误，内部携带原始原因
    #[error("NCM 解密失败: {0}")]
    DecryptionFailed(#[source] Box<NcmError>),

    /// 十六进制解码失败 (源自 `hex::FromHexError`)
    #[error("十六进制解码失败: {0}")]
    Hex(#[from] hex::FromHexError),

    /// Base64 解码失败 (源自 `base64::DecodeError`)
    #[error("Base64 解码失败: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 转换失败 (源自 `string::FromUtf8Error`)
    #[error("UTF-8 转换失败: {0}")]
    FromUtf8(#[from] FromUtf8Error),

    /// JSON 解析失败 (源自 `serde_json::Error`)
    #[error("JSON 解析失败: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// I/O 错误 (源自 `io::Error`)
    #[error("I/O 错误: {0}")]
    Io(#[from] io::Error),

    /// 网络请求失败 (源自 `reqwest::Error`)
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),

    /// 封面下载失败
    #[error("封面下载失败: {0}")]
    CoverDownload(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl NcmError {
    /// 剥去 `DecryptionFailed` 包装，返回最初的错误原因。
    #[must_use]
    pub fn root_cause(&self) -> &NcmError {
        match self {
            NcmError::DecryptionFailed(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// 判断错误是否属于致命的容器/密码错误。
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.root_cause(),
            NcmError::InvalidHeader | NcmError::TruncatedContainer { .. } | NcmError::Cipher(_)
        )
    }
}

/// `NcmError` 的 `Result` 类型别名，方便在函数签名中使用。
pub type Result<T> = std::result::Result<T, NcmError>;
