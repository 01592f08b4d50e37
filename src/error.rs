use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 远程服务调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 运行被取消
    #[error("运行已取消")]
    Cancelled,
}

/// 远程服务调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（未拿到状态码）
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 远程服务返回非 2xx 状态码
    #[error("远程服务返回错误状态 ({endpoint}): HTTP {status}, body={body:?}")]
    RemoteService {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 响应内容缺少预期字段或无法解析
    #[error("响应格式错误 ({endpoint}): {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 表格解析失败
    #[error("表格解析失败 ({path}): {source}")]
    TableParseFailed {
        path: String,
        #[source]
        source: csv::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 请求的输出字段在结果实体中不存在
    #[error("输出字段 '{field}' 不存在于结果实体中 (实体: {identifier})")]
    UnknownOutField { field: String, identifier: String },
    /// 输入表格缺少指定列
    #[error("输入表格 {path} 缺少列 '{column}'")]
    MissingColumn { path: String, column: String },
    /// 未指定任何输出字段
    #[error("至少需要一个输出字段")]
    EmptyOutFields,
    /// 配置值非法
    #[error("配置项 {name} 的值 '{value}' 非法: {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络请求失败错误
    pub fn request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建响应格式错误
    pub fn malformed(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Api(ApiError::MalformedResponse {
            endpoint: endpoint.into(),
            reason: reason.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建表格解析错误
    pub fn table_failed(path: impl Into<String>, source: csv::Error) -> Self {
        AppError::File(FileError::TableParseFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为远程服务返回的非 2xx 错误
    pub fn is_remote_service(&self) -> bool {
        matches!(self, AppError::Api(ApiError::RemoteService { .. }))
    }

    /// 是否为响应格式错误
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, AppError::Api(ApiError::MalformedResponse { .. }))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_service_error_display() {
        let err = AppError::from(ApiError::RemoteService {
            endpoint: "/queries.json".to_string(),
            status: 503,
            body: "busy".to_string(),
        });

        assert!(err.is_remote_service());
        assert!(!err.is_malformed_response());
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn test_malformed_constructor() {
        let err = AppError::malformed("/queries/1.json", "缺少 id 字段");
        assert!(err.is_malformed_response());
        assert!(err.to_string().contains("缺少 id 字段"));
    }
}
