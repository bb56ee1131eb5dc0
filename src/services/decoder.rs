//! 图像解码 - 业务能力层

use image::ImageReader;
use std::io::Cursor;

use crate::error::FetchFailure;
use crate::models::PageImage;

/// 将原始字节解码为一页 RGB 图像
///
/// 格式由内容推断；带透明通道的图像会被转换为 RGB（PDF 页面不需要透明度）。
pub fn decode_page(bytes: &[u8]) -> Result<PageImage, FetchFailure> {
    let image = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FetchFailure::Decode(format!("无法识别格式: {}", e)))?
        .decode()
        .map_err(|e| FetchFailure::Decode(e.to_string()))?;

    Ok(PageImage::new(image.to_rgb8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, image::ImageFormat::Png)
            .expect("Failed to encode PNG");
        buffer.into_inner()
    }

    #[test]
    fn test_decode_rgba_png_to_rgb() {
        let img = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 128]));
        let page = decode_page(&png_bytes(&img)).unwrap();

        assert_eq!(page.width(), 4);
        assert_eq!(page.height(), 3);
        assert_eq!(page.pixels().get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_page(b"<html>Access denied</html>").unwrap_err();
        assert!(matches!(err, FetchFailure::Decode(_)));
    }

    #[test]
    fn test_decode_truncated_png_fails() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255]));
        let bytes = png_bytes(&img);
        let err = decode_page(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, FetchFailure::Decode(_)));
    }
}
