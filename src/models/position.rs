//! 页码位置
//!
//! 封装"这是文档的第几页"这一信息

use std::fmt::Display;

/// 页码位置（从 1 开始）
///
/// 一个位置唯一对应一个远程资源，也唯一对应输出文档中的一个槽位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(u32);

impl Position {
    /// 创建位置，0 不是合法页码
    pub fn new(index: u32) -> Option<Self> {
        if index == 0 {
            None
        } else {
            Some(Self(index))
        }
    }

    /// 获取页码数值
    pub fn get(self) -> u32 {
        self.0
    }

    /// 资源标识：小写十六进制，无前导零，无 `0x` 前缀
    pub fn hex_id(self) -> String {
        format!("{:x}", self.0)
    }

    /// 在结果表中的下标
    pub(crate) fn slot(self) -> usize {
        (self.0 - 1) as usize
    }

    /// 生成 `1..=total` 的全部位置
    pub fn range(total: u32) -> impl Iterator<Item = Position> {
        (1..=total).map(Position)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
