//! # 命令处理逻辑模块
//!
//! 包含处理 `hide` 和 `recover` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、封装消息帧、调用核心隐写算法以及向用户报告结果。
//!
//! 核心编解码函数本身不嵌入任何长度信息，因此本模块在消息前封装一个
//! 4 字符 (32 bits，大端序) 的长度前缀，使 `recover` 无需额外参数即可
//! 确定要提取多少个字符。

use crate::cli::{HideArgs, RecoverArgs};
use crate::constants::{BITS_PER_CHAR, LENGTH_PREFIX_CHARS};
use crate::steganography::{capacity_bits, decode, encode, message_bytes};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取图像和文本文件、检查隐写空间是否足够、为消息封装长度前缀、
/// 调用隐写核心函数，最后将结果图像写入目标路径。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与覆盖开关的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像或文本文件。
/// * 图像没有足够的通道槽位来容纳长度前缀和全部消息字符。
/// * 消息中含有码点超过 255 的字符。
/// * 无法写入到目标图像文件 (例如目标扩展名对应的是有损格式)。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = args
        .dest
        .unwrap_or_else(|| doctored_path(&args.image));

    anyhow::ensure!(
        args.force || !dest.exists(),
        "Output file already exists: {} \nUse --force to overwrite it.",
        dest.to_string_lossy().red().bold()
    );

    let image = image::open(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let message = fs::read_to_string(&args.text).with_context(|| {
        format!(
            "Unable to read text file: {}",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    // 先校验消息本身，使报错中的字符位置与用户的文本一致，
    // 而不是与封帧后的内部字符串一致。
    message_bytes(&message).with_context(|| {
        format!(
            "The text file '{}' contains characters that cannot be embedded.",
            args.text.to_string_lossy().red().bold()
        )
    })?;

    let required_space = message.chars().count() as u64;
    let available_space = (capacity_bits(&image) / BITS_PER_CHAR as u64)
        .saturating_sub(LENGTH_PREFIX_CHARS as u64);

    anyhow::ensure!(
        available_space >= required_space,
        "Not enough space in the image to hide the text. \nRequired: {} characters, Available: {} characters",
        required_space.to_string().red().bold(),
        available_space.to_string().green().bold()
    );

    let framed = frame_message(&message)?;

    let stego = encode(&image, &framed).with_context(|| {
        format!(
            "Failed to hide the message in: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    stego.save(&dest).with_context(|| {
        format!(
            "Unable to write to target image file: {} \nOnly lossless formats (PNG, BMP, TIFF, WebP, QOI) can carry the hidden bits.",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、先恢复 4 字符的长度前缀、校验该长度
/// 是否可能存在于图像中，再恢复完整消息帧并剥离前缀，
/// 最后将恢复的文本内容写入目标文本文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径与覆盖开关的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 目标文件已存在且未指定 `--force`。
/// * 无法读取输入的图像文件。
/// * 图像太小，连长度前缀都无法容纳。
/// * 恢复出的长度超出图像容量，即图像中没有有效的隐藏消息。
/// * 无法写入到目标文本文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let text_path = args
        .text
        .unwrap_or_else(|| recovered_path(&args.image));

    anyhow::ensure!(
        args.force || !text_path.exists(),
        "Output file already exists: {} \nUse --force to overwrite it.",
        text_path.to_string_lossy().red().bold()
    );

    let image = image::open(&args.image).with_context(|| {
        format!(
            "Unable to read image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let prefix = decode(&image, LENGTH_PREFIX_CHARS).with_context(|| {
        format!(
            "Failed to recover the message length from '{}'. \nThe image may not contain a hidden message or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let text_len = prefix_length(&prefix)?;
    let frame_chars = (LENGTH_PREFIX_CHARS as u64).saturating_add(u64::from(text_len));

    anyhow::ensure!(
        frame_chars.saturating_mul(BITS_PER_CHAR as u64) <= capacity_bits(&image),
        "The image '{}' does not contain a valid hidden message. \nThe recovered length {} exceeds what the image could hold.",
        args.image.to_string_lossy().red().bold(),
        text_len.to_string().red().bold()
    );

    let framed = decode(&image, LENGTH_PREFIX_CHARS + text_len as usize).with_context(|| {
        format!(
            "Failed to recover the hidden text from '{}'. \nThe image may not contain a hidden message or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;
    let message: String = framed.chars().skip(LENGTH_PREFIX_CHARS).collect();

    fs::write(&text_path, message).with_context(|| {
        format!(
            "Unable to write to target text file: {}",
            text_path.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The text has been successfully recovered and saved: {}",
        text_path.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 在消息前封装 4 字符的大端序长度前缀，供 `recover` 盲提取时使用。
fn frame_message(message: &str) -> Result<String> {
    let length = u32::try_from(message.chars().count())
        .context("The message is too long to frame: its length does not fit in 32 bits.")?;

    let mut framed = String::with_capacity(LENGTH_PREFIX_CHARS + message.len());
    framed.extend(length.to_be_bytes().into_iter().map(char::from));
    framed.push_str(message);

    Ok(framed)
}

/// 将恢复出的 4 个前缀字符还原为大端序的消息长度。
fn prefix_length(prefix: &str) -> Result<u32> {
    let bytes: Vec<u8> = prefix
        .chars()
        .map(|character| u32::from(character) as u8)
        .collect();
    let bytes: [u8; 4] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("The recovered length prefix is malformed."))?;

    Ok(u32::from_be_bytes(bytes))
}

/// 缺省的隐写结果路径：输入图像旁的 `doctored_<文件名>`。
fn doctored_path(image: &Path) -> PathBuf {
    let file_name = image.file_name().map_or_else(
        || String::from("doctored_image.png"),
        |name| format!("doctored_{}", name.to_string_lossy()),
    );

    image.with_file_name(file_name)
}

/// 缺省的恢复文本路径：图像旁的 `recovered_<图像名>.txt`。
fn recovered_path(image: &Path) -> PathBuf {
    let stem = image.file_stem().map_or_else(
        || String::from("recovered_message"),
        |stem| format!("recovered_{}", stem.to_string_lossy()),
    );

    image.with_file_name(format!("{stem}.txt"))
}
