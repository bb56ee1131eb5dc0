//! URL 模板 - 业务能力层
//!
//! 只负责"页码 → 请求 URL"的纯转换

use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::models::Position;

/// 匹配 `...bg<页码>.png...`，页码段为十六进制数字
const SAMPLE_PATTERN: &str = r"^(.*bg)[0-9a-fA-F]+(\.png.*)$";

/// 由示例 URL 推导出的 URL 模板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    prefix: String,
    suffix: String,
}

impl UrlTemplate {
    /// 从任意一页的示例 URL 解析模板
    ///
    /// 找不到 `bgX.png` 结构时返回 [`AppError::InvalidPattern`]
    pub fn parse(sample_url: &str) -> AppResult<Self> {
        let sample_url = sample_url.trim();
        let pattern =
            Regex::new(SAMPLE_PATTERN).map_err(|_| AppError::invalid_pattern(sample_url))?;

        let captures = pattern
            .captures(sample_url)
            .ok_or_else(|| AppError::invalid_pattern(sample_url))?;

        Ok(Self {
            prefix: captures[1].to_string(),
            suffix: captures[2].to_string(),
        })
    }

    /// 生成指定页码的请求 URL
    pub fn resolve(&self, position: Position) -> String {
        format!("{}{}{}", self.prefix, position.hex_id(), self.suffix)
    }
}
