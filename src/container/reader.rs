//! 带边界检查的字节游标。

use crate::error::{NcmError, Result};

/// 在不可变缓冲区上顺序读取的游标。
///
/// `offset` 永远不会超过缓冲区长度；任何越界读取都返回
/// `NcmError::TruncatedContainer`，而不是读取不足的数据。
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// 从缓冲区起点创建游标。
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// 已消耗的字节数。
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 剩余未读的字节数。
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// 读取恰好 `len` 个字节。
    ///
    /// `context` 用于错误信息，描述正在读取的字段。
    pub fn read_bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8]> {
        self.ensure(len, context)?;
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    /// 跳过恰好 `len` 个字节。
    pub fn skip(&mut self, len: usize, context: &'static str) -> Result<()> {
        self.ensure(len, context)?;
        self.offset += len;
        Ok(())
    }

    /// 读取一个小端序 `u32`。
    pub fn read_u32_le(&mut self, context: &'static str) -> Result<u32> {
        let bytes = self.read_bytes(4, context)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(buf))
    }

    /// 读取一个小端序 `u32` 长度前缀，随后读取对应长度的数据块。
    pub fn read_length_prefixed(&mut self, context: &'static str) -> Result<&'a [u8]> {
        let len = self.read_u32_le(context)? as usize;
        self.read_bytes(len, context)
    }

    /// 消耗并返回所有剩余字节。
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.offset..];
        self.offset = self.data.len();
        rest
    }

    fn ensure(&self, needed: usize, context: &'static str) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(NcmError::TruncatedContainer {
                context,
                needed,
                remaining,
            });
        }
        Ok(())
    }
}
