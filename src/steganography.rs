use image::{DynamicImage, GenericImageView, RgbImage};

use crate::constants::{BITS_PER_CHAR, CHANNELS_PER_PIXEL, MAX_CODE_POINT};
use crate::error::StegoError;

pub fn capacity_bits(image: &DynamicImage) -> u64 {
    let (width, height) = image.dimensions();
    u64::from(width)
        .saturating_mul(u64::from(height))
        .saturating_mul(CHANNELS_PER_PIXEL as u64)
}

pub fn encode(image: &DynamicImage, message: &str) -> Result<RgbImage, StegoError> {
    let bytes = message_bytes(message)?;

    let required = (bytes.len() as u64).saturating_mul(BITS_PER_CHAR as u64);
    let capacity = capacity_bits(image);
    if required > capacity {
        return Err(StegoError::PayloadTooLarge { required, capacity });
    }

    // 归一化为 RGB 三通道并得到独立副本，调用者持有的图像不会被改动。
    let mut stego = image.to_rgb8();
    let width = stego.width() as usize;
    let height = stego.height() as usize;
    let total_bits = bytes.len() * BITS_PER_CHAR;
    let samples: &mut [u8] = &mut stego;

    // 遍历顺序固定为列外层、行内层，每个像素依次写入 R、G、B 的最低位。
    let mut index = 0;
    'columns: for x in 0..width {
        for y in 0..height {
            let base = (y * width + x) * CHANNELS_PER_PIXEL;
            for channel in 0..CHANNELS_PER_PIXEL {
                if index == total_bits {
                    break 'columns;
                }
                let bit =
                    (bytes[index / BITS_PER_CHAR] >> (BITS_PER_CHAR - 1 - index % BITS_PER_CHAR))
                        & 1;
                samples[base + channel] = (samples[base + channel] & 0xFE) | bit;
                index += 1;
            }
        }
    }

    Ok(stego)
}

pub fn decode(image: &DynamicImage, message_length: usize) -> Result<String, StegoError> {
    let requested = (message_length as u64).saturating_mul(BITS_PER_CHAR as u64);
    let capacity = capacity_bits(image);
    if requested > capacity {
        return Err(StegoError::InsufficientData {
            requested,
            capacity,
        });
    }

    // 已是 RGB8 时直接借用，否则归一化出一份副本再读取。
    let converted;
    let grid = match image.as_rgb8() {
        Some(buffer) => buffer,
        None => {
            converted = image.to_rgb8();
            &converted
        }
    };

    let width = grid.width() as usize;
    let height = grid.height() as usize;
    let total_bits = message_length * BITS_PER_CHAR;
    let samples: &[u8] = grid;

    // 与编码完全相同的遍历顺序，逐位取出每个通道的最低位。
    let mut bytes = vec![0u8; message_length];
    let mut index = 0;
    'columns: for x in 0..width {
        for y in 0..height {
            let base = (y * width + x) * CHANNELS_PER_PIXEL;
            for channel in 0..CHANNELS_PER_PIXEL {
                if index == total_bits {
                    break 'columns;
                }
                bytes[index / BITS_PER_CHAR] |= (samples[base + channel] & 1)
                    << (BITS_PER_CHAR - 1 - index % BITS_PER_CHAR);
                index += 1;
            }
        }
    }

    Ok(bytes.into_iter().map(char::from).collect())
}

pub fn message_bytes(message: &str) -> Result<Vec<u8>, StegoError> {
    let mut bytes = Vec::with_capacity(message.len());

    for (index, character) in message.chars().enumerate() {
        let code = u32::from(character);
        if code > MAX_CODE_POINT {
            return Err(StegoError::UnsupportedCharacter { character, index });
        }
        bytes.push(code as u8);
    }

    Ok(bytes)
}
