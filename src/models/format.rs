//! 结果格式与表格方言

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 远程服务支持的结果格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    #[default]
    Json,
    Csv,
    Sdf,
}

impl ResultFormat {
    /// URL 中使用的扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            ResultFormat::Json => "json",
            ResultFormat::Csv => "csv",
            ResultFormat::Sdf => "sdf",
        }
    }
}

impl fmt::Display for ResultFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ResultFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResultFormat::Json),
            "csv" => Ok(ResultFormat::Csv),
            "sdf" => Ok(ResultFormat::Sdf),
            other => Err(ConfigError::InvalidValue {
                name: "format".to_string(),
                value: other.to_string(),
                expected: "json / csv / sdf".to_string(),
            }),
        }
    }
}

/// 表格方言
///
/// 命名沿用常见的 `excel`（逗号分隔）与 `excel-tab`（制表符分隔）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableDialect {
    #[default]
    Excel,
    ExcelTab,
}

impl TableDialect {
    /// 字段分隔符
    pub fn delimiter(&self) -> u8 {
        match self {
            TableDialect::Excel => b',',
            TableDialect::ExcelTab => b'\t',
        }
    }

    /// 按该方言构建表格读取器（要求表头）
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.delimiter(self.delimiter()).has_headers(true);
        builder
    }

    /// 按该方言构建表格写入器
    pub fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder.delimiter(self.delimiter());
        builder
    }
}

impl fmt::Display for TableDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableDialect::Excel => f.write_str("excel"),
            TableDialect::ExcelTab => f.write_str("excel-tab"),
        }
    }
}

impl FromStr for TableDialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excel" | "csv" | "comma" => Ok(TableDialect::Excel),
            "excel-tab" | "excel_tab" | "tsv" | "tab" => Ok(TableDialect::ExcelTab),
            other => Err(ConfigError::InvalidValue {
                name: "dialect".to_string(),
                value: other.to_string(),
                expected: "excel / excel-tab".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_aliases() {
        assert_eq!("tsv".parse::<TableDialect>().unwrap(), TableDialect::ExcelTab);
        assert_eq!("Excel".parse::<TableDialect>().unwrap(), TableDialect::Excel);
        assert_eq!(TableDialect::ExcelTab.delimiter(), b'\t');
        assert!("pipe".parse::<TableDialect>().is_err());
    }

    #[test]
    fn test_result_format_parse() {
        assert_eq!("SDF".parse::<ResultFormat>().unwrap(), ResultFormat::Sdf);
        assert_eq!(ResultFormat::Csv.to_string(), "csv");
        assert!("xml".parse::<ResultFormat>().is_err());
    }
}
