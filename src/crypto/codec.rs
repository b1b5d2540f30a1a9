//! 十六进制与 Base64 的编解码工具。

use base64::{Engine as _, engine::general_purpose};

use crate::error::Result;

/// 将十六进制字符串按两个字符一组转换为字节。
///
/// 大小写均可接受。奇数长度或包含非十六进制字符时返回 `NcmError::Hex`，不会截断。
pub fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>> {
    Ok(hex::decode(hex_str)?)
}

/// 将字节转换为小写十六进制字符串，每个字节恰好两位。
#[must_use]
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// 标准 Base64 解码（带填充的标准字母表）。
pub fn base64_decode(encoded: &str) -> Result<Vec<u8>> {
    Ok(general_purpose::STANDARD.decode(encoded.as_bytes())?)
}
