//! PDF 生成 - 业务能力层
//!
//! 只负责"把有序的页面图像写成一个 PDF 文件"，不关心页面从哪里来
//!
//! ## 文件结构
//! - 每页一个 Page 对象，页面尺寸等于图像像素尺寸（72 dpi）
//! - 图像以 JPEG（`/DCTDecode`）嵌入
//! - 先写入同目录临时文件再重命名，失败时不会留下残缺文件

use std::io::Write;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, info};

use crate::error::AssembleError;
use crate::models::PageImage;

/// PDF 生成器
pub struct PdfAssembler {
    jpeg_quality: u8,
}

impl PdfAssembler {
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// 将页面按顺序写入 `output`
    ///
    /// # 参数
    /// - `pages`: 已去除缺页的有序页面
    /// - `requested`: 原始请求页数，仅用于日志
    /// - `output`: 输出路径
    ///
    /// # 返回
    /// 写入的页数
    pub fn assemble(
        &self,
        pages: &[PageImage],
        requested: usize,
        output: &Path,
    ) -> Result<usize, AssembleError> {
        let document = self.render(pages)?;

        write_atomically(output, &document)?;

        info!(
            "✓ PDF 已生成: {} ({}/{} 页, {:.2} MB)",
            output.display(),
            pages.len(),
            requested,
            document.len() as f64 / 1_048_576.0
        );

        Ok(pages.len())
    }

    /// 在内存中生成完整的 PDF 字节
    pub fn render(&self, pages: &[PageImage]) -> Result<Vec<u8>, AssembleError> {
        if pages.is_empty() {
            return Err(AssembleError::EmptyInput);
        }

        let mut pdf = PdfWriter::new();
        let page_ids: Vec<usize> = (0..pages.len()).map(page_object_id).collect();

        pdf.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");

        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        pdf.object(
            2,
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()).as_bytes(),
        );

        for (idx, page) in pages.iter().enumerate() {
            let page_id = page_ids[idx];
            let content_id = page_id + 1;
            let image_id = page_id + 2;
            let (w, h) = (page.width(), page.height());

            let jpeg = self.encode_jpeg(page, idx + 1)?;
            debug!("第 {} 页: {}x{}, JPEG {} 字节", idx + 1, w, h, jpeg.len());

            pdf.object(
                page_id,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] \
                     /Resources << /XObject << /Im0 {image_id} 0 R >> >> \
                     /Contents {content_id} 0 R >>"
                )
                .as_bytes(),
            );

            let content = format!("q {w} 0 0 {h} 0 0 cm /Im0 Do Q");
            pdf.stream(content_id, "", content.as_bytes());

            pdf.stream(
                image_id,
                &format!(
                    "/Type /XObject /Subtype /Image /Width {w} /Height {h} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode"
                ),
                &jpeg,
            );
        }

        Ok(pdf.finish())
    }

    fn encode_jpeg(&self, page: &PageImage, page_number: usize) -> Result<Vec<u8>, AssembleError> {
        let pixels = page.pixels();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.jpeg_quality)
            .encode(
                pixels.as_raw(),
                pixels.width(),
                pixels.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|source| AssembleError::Encode {
                page: page_number,
                source,
            })?;
        Ok(jpeg)
    }
}

/// 第 `idx` 页（从 0 开始）的 Page 对象编号；1、2 为 Catalog 和 Pages
fn page_object_id(idx: usize) -> usize {
    3 + idx * 3
}

fn temp_sibling(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    output.with_file_name(name)
}

/// 先写临时文件再重命名；任一步失败都删除临时文件
fn write_atomically(output: &Path, bytes: &[u8]) -> Result<(), AssembleError> {
    let tmp_path = temp_sibling(output);
    if let Err(e) = write_file(&tmp_path, bytes) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    std::fs::rename(&tmp_path, output).map_err(|source| {
        let _ = std::fs::remove_file(&tmp_path);
        AssembleError::Write {
            path: output.display().to_string(),
            source,
        }
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), AssembleError> {
    let to_error = |source| AssembleError::Write {
        path: path.display().to_string(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(to_error)?;
    file.write_all(bytes).map_err(to_error)?;
    file.sync_all().map_err(to_error)?;
    Ok(())
}

/// 最小 PDF 写入器：顺序写对象，记录偏移量，最后写交叉引用表
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    /// 对象必须按编号 1, 2, 3... 依次写入
    fn object(&mut self, id: usize, body: &[u8]) {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buf.len());
        self.buf.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, id: usize, dict_entries: &str, data: &[u8]) {
        let mut body = Vec::with_capacity(data.len() + 128);
        body.extend_from_slice(
            format!("<< {} /Length {} >>\nstream\n", dict_entries, data.len()).as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\nendstream");
        self.object(id, &body);
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let count = self.offsets.len() + 1;

        self.buf
            .extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", count).as_bytes());
        for offset in &self.offsets {
            self.buf
                .extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        self.buf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                count, xref_offset
            )
            .as_bytes(),
        );
        self.buf
    }
}
