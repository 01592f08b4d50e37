//! 输出路径保护
//!
//! 保证输出文件不会覆盖任何已存在的文件

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// 默认后缀
pub const DEFAULT_SUFFIX: &str = "_annotated";

/// 生成一个不与现有文件冲突的路径
///
/// 候选路径存在时，在最后一个扩展名之前插入 `suffix`（无扩展名则追加），
/// 直到候选路径不存在为止。
pub fn derive_nonclashing_path(original: &Path, suffix: &str) -> PathBuf {
    let mut candidate = original.to_path_buf();
    while candidate.exists() {
        candidate = insert_suffix(&candidate, suffix);
    }
    candidate
}

fn insert_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}
