/// 每个像素可用于隐写的颜色通道数。
/// 像素网格统一归一化为 RGB 三通道，每个通道的最低有效位存储 1 bit。
pub const CHANNELS_PER_PIXEL: usize = 3;

/// 单个字符占用的比特数。
/// 每个字符按 `u8` (8 bits) 处理，因此图像的字符容量为比特容量除以 8。
pub const BITS_PER_CHAR: usize = 8;

/// 消息字符允许的最大码点。
/// 每个字符必须恰好放入一个 8-bit 槽位，码点超过 255 的字符无法嵌入。
pub const MAX_CODE_POINT: u32 = 255;

/// 命令行封帧时用于记录消息长度的前缀字符数。
/// 消息长度按 `u32` 大端序 (32 bits) 编码，折合 32 / 8 = 4 个字符，
/// 嵌入在消息本身之前。
pub const LENGTH_PREFIX_CHARS: usize = 4;
