//! 解密流程中使用的数据模型。

pub mod decrypted;
pub mod metadata;

pub use decrypted::DecryptedResult;
pub use metadata::Metadata;
