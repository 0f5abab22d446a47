//! # pixel_hide 库
//!
//! 本库包含基于像素网格 LSB 隐写工具的核心逻辑。

// 声明库包含的所有模块。

pub mod cli;
pub mod constants;
pub mod error;
pub mod handler;
pub mod steganography;
