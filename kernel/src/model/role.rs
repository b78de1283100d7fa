use strum::{AsRefStr, EnumString};

/// 付与可能なロール。文字列比較ではなく必ずこの列挙型で扱う
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    SuperAdmin,
}
