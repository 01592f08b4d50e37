use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use classyfire_client::config::parse_outfields;
use classyfire_client::utils::logging;
use classyfire_client::{App, Config, JobId, ResultFormat, StructureRecord, TableDialect, TabularQuery};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// ClassyFire 化合物分类客户端
#[derive(Parser, Debug)]
#[command(name = "classyfire", version, about)]
struct Cli {
    /// TOML 配置文件（缺省时读取环境变量）
    #[arg(long, global = true, env = "CLASSYFIRE_CONFIG")]
    config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 注释表格中的所有化合物，写出扩展后的表格
    Annotate {
        /// 输入表格
        input: PathBuf,
        /// 含 InChIKey 或 SMILES 的列名
        #[arg(long)]
        structure_key: String,
        /// 标识列（可选）
        #[arg(long)]
        id_key: Option<String>,
        /// 输出路径（缺省时由输入路径推导）
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 表格方言: excel / excel-tab
        #[arg(long)]
        dialect: Option<TableDialect>,
        /// 输出字段，逗号分隔
        #[arg(long)]
        outfields: Option<String>,
        /// 每个任务最多提交的化合物数量
        #[arg(long)]
        chunk_size: Option<usize>,
        /// 轮询间隔（秒）
        #[arg(long)]
        sleep_interval: Option<u64>,
        /// 任务标签
        #[arg(long)]
        label: Option<String>,
    },
    /// 提交化合物并输出任务 ID
    Submit {
        /// 化合物（`id<TAB>structure` 或 `structure`）
        structures: Vec<String>,
        /// 从文件读取，每行一个化合物
        #[arg(long)]
        file: Option<PathBuf>,
        /// 任务标签
        #[arg(long, default_value = "classyfire")]
        label: String,
    },
    /// 获取任务结果
    Results {
        job_id: String,
        #[arg(long, default_value = "json")]
        format: ResultFormat,
    },
    /// 按 InChIKey 查询已有分类
    Entity {
        key: String,
        #[arg(long, default_value = "json")]
        format: ResultFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path).await?,
        None => Config::from_env(),
    };
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command {
        Command::Annotate {
            input,
            structure_key,
            id_key,
            output,
            dialect,
            outfields,
            chunk_size,
            sleep_interval,
            label,
        } => {
            if let Some(dialect) = dialect {
                config.dialect = dialect;
            }
            if let Some(outfields) = outfields {
                config.outfields = parse_outfields(&outfields);
            }
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            if let Some(sleep_interval) = sleep_interval {
                config.sleep_interval_secs = sleep_interval;
            }

            let mut query = TabularQuery::new(input, structure_key);
            query.id_key = id_key;
            query.outpath = output;
            query.label = label;

            let app = App::initialize(config)?;
            let cancel = CancellationToken::new();
            spawn_ctrl_c_handler(cancel.clone());

            app.annotate(query, cancel).await?;
        }
        Command::Submit {
            structures,
            file,
            label,
        } => {
            let mut records: Vec<StructureRecord> = structures
                .iter()
                .filter_map(|s| StructureRecord::parse_line(s))
                .collect();
            if let Some(file) = file {
                let content = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("无法读取文件: {}", file.display()))?;
                records.extend(content.lines().filter_map(StructureRecord::parse_line));
            }

            let app = App::initialize(config)?;
            let job_id = app.submit(&records, &label).await?;
            println!("{}", job_id);
        }
        Command::Results { job_id, format } => {
            let app = App::initialize(config)?;
            println!("{}", app.results(&JobId::new(job_id), format).await?);
        }
        Command::Entity { key, format } => {
            let app = App::initialize(config)?;
            println!("{}", app.entity(&key, format).await?);
        }
    }

    Ok(())
}

/// Ctrl-C 触发取消，已写出的行保留
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ 收到中断信号，正在停止...");
            cancel.cancel();
        }
    });
}
