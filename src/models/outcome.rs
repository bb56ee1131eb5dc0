//! 单次抓取结果

use image::RgbImage;

use crate::error::FetchFailure;

/// 解码后的一页图像（RGB，无透明通道）
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    pixels: RgbImage,
}

impl PageImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}

/// 一个位置的一次抓取结果
///
/// 创建后不再修改；重试会产生新的结果并覆盖同一位置的旧结果。
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// HTTP 200 且成功解码
    Ok(PageImage),
    /// 网络、状态码、读取或解码失败
    Failed(FetchFailure),
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchOutcome::Ok(_))
    }
}

impl From<Result<PageImage, FetchFailure>> for FetchOutcome {
    fn from(result: Result<PageImage, FetchFailure>) -> Self {
        match result {
            Ok(page) => FetchOutcome::Ok(page),
            Err(reason) => FetchOutcome::Failed(reason),
        }
    }
}
