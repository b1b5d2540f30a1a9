//! NCM 容器所使用的密码学原语。
//!
//! - [`codec`]：十六进制与 Base64 编解码。
//! - [`block`]：使用固定密钥的 AES-128-ECB 解密及宽松的去填充策略。
//! - [`stream`]：RC4 风格的密钥编排与 NCM 专用的 256 字节掩码。
//!
//! 本实现仅用于解密 NCM 文件，不应用于实际安全目的。

pub mod block;
pub mod codec;
pub mod stream;

pub use block::{CORE_KEY, META_KEY, aes_ecb_decrypt, unpad};
pub use codec::{base64_decode, bytes_to_hex, hex_to_bytes};
pub use stream::{KeyBox, NcmMask};
