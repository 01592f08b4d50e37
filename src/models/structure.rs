use std::fmt;

/// 提交给分类服务的单个化合物
///
/// 位置即身份：输入顺序决定结果与输入行的对齐关系。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureRecord {
    /// 用户自定义标识（可选）
    pub id: Option<String>,
    /// InChIKey 或 SMILES
    pub structure: String,
}

impl StructureRecord {
    pub fn new(structure: impl Into<String>) -> Self {
        Self {
            id: None,
            structure: structure.into(),
        }
    }

    pub fn with_id(id: impl Into<String>, structure: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            structure: structure.into(),
        }
    }

    /// 解析一行 `id<TAB>structure` 或单独的 `structure`
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match line.split_once('\t') {
            Some((id, structure)) if !id.trim().is_empty() => {
                Some(Self::with_id(id.trim(), structure.trim()))
            }
            Some((_, structure)) => Some(Self::new(structure.trim())),
            None => Some(Self::new(line)),
        }
    }

    /// 提交载荷中的一行
    pub fn query_line(&self) -> String {
        match &self.id {
            Some(id) => format!("{}\t{}", id, self.structure),
            None => self.structure.clone(),
        }
    }
}

/// 远程任务标识
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
