//! # 错误类型模块
//!
//! 定义隐写编解码核心的类型化错误。
//! 处理层 (`handler`) 会将这些错误包装进 `anyhow` 的错误链中继续上报。

use thiserror::Error;

/// 隐写编码或解码过程中可能出现的所有错误。
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StegoError {
    /// 消息位流超过了图像的嵌入容量。图像保持原样，不会发生部分写入。
    #[error("The message needs {required} bits but the image can only hold {capacity} bits.")]
    PayloadTooLarge { required: u64, capacity: u64 },

    /// 请求恢复的字符数超过了图像可能承载的容量。
    #[error("Requested {requested} bits but the image only holds {capacity} bits.")]
    InsufficientData { requested: u64, capacity: u64 },

    /// 消息中出现了无法放入 8-bit 槽位的字符。
    #[error(
        "The character {character:?} at index {index} has a code point above 255 and cannot be embedded."
    )]
    UnsupportedCharacter { character: char, index: usize },
}
