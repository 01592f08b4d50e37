//! 测试用的脚本化传输：按提交顺序为每个任务预设状态序列
#![allow(dead_code)]

use async_trait::async_trait;
use classyfire_client::error::{ApiError, AppResult};
use classyfire_client::{ResultFormat, Transport};
use serde_json::{json, Value as JsonValue};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// 单次轮询返回的状态
#[derive(Debug, Clone)]
pub enum Step {
    Pending(&'static str),
    Done,
}

pub struct ScriptedTransport {
    /// 第 N 个提交的任务的状态序列；最后一个状态会一直重复
    plans: Vec<Vec<Step>>,
    submit_status: Option<u16>,
    /// 完成时少返回的实体数量（用于构造数量不一致）
    drop_entities: usize,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    submissions: Vec<JsonValue>,
    jobs: HashMap<String, (Vec<String>, VecDeque<Step>)>,
    fetch_log: Vec<String>,
}

impl ScriptedTransport {
    pub fn new(plans: Vec<Vec<Step>>) -> Self {
        Self {
            plans,
            submit_status: None,
            drop_entities: 0,
            state: Mutex::new(State::default()),
        }
    }

    /// 所有任务一次轮询即完成
    pub fn all_done() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing_submit(status: u16) -> Self {
        Self {
            submit_status: Some(status),
            ..Self::all_done()
        }
    }

    pub fn dropping_entities(count: usize) -> Self {
        Self {
            drop_entities: count,
            ..Self::all_done()
        }
    }

    pub fn submissions(&self) -> Vec<JsonValue> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// 每个提交载荷中的化合物行
    pub fn submitted_lines(&self) -> Vec<Vec<String>> {
        self.submissions()
            .iter()
            .map(|body| {
                body["query_input"]
                    .as_str()
                    .unwrap()
                    .split('\n')
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    pub fn fetch_log(&self) -> Vec<String> {
        self.state.lock().unwrap().fetch_log.clone()
    }
}

pub fn entity_for(job_id: &str, position: usize, line: &str) -> JsonValue {
    let structure = line.rsplit('\t').next().unwrap_or(line);
    json!({
        "identifier": format!("Q{}-{}", job_id, position + 1),
        "smiles": structure,
        "kingdom": {"name": "Organic compounds", "chemont_id": "CHEMONTID:0000000"},
        "superclass": {"name": "Organic oxygen compounds", "chemont_id": "CHEMONTID:0004603"},
        "class": null,
        "subclass": null,
        "description": format!("desc {}", structure),
        "substituents": ["ketone", "alkane"]
    })
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit(&self, body: &JsonValue) -> AppResult<String> {
        if let Some(status) = self.submit_status {
            return Err(ApiError::RemoteService {
                endpoint: "/queries.json".to_string(),
                status,
                body: "unavailable".to_string(),
            }
            .into());
        }

        let mut state = self.state.lock().unwrap();
        let index = state.submissions.len();
        let job_id = (1000 + index + 1).to_string();

        let lines = body["query_input"]
            .as_str()
            .unwrap_or_default()
            .split('\n')
            .map(str::to_string)
            .collect();
        let plan = self
            .plans
            .get(index)
            .cloned()
            .unwrap_or_else(|| vec![Step::Done]);

        state.submissions.push(body.clone());
        state.jobs.insert(job_id.clone(), (lines, plan.into()));

        Ok(json!({"id": job_id.parse::<u64>().unwrap(), "label": body["label"]}).to_string())
    }

    async fn fetch(&self, job_id: &str, format: ResultFormat) -> AppResult<String> {
        assert_eq!(format, ResultFormat::Json);

        let mut state = self.state.lock().unwrap();
        state.fetch_log.push(job_id.to_string());

        let (lines, steps) = state.jobs.get_mut(job_id).expect("未知任务");
        let step = if steps.len() > 1 {
            steps.pop_front().unwrap()
        } else {
            steps.front().cloned().unwrap()
        };

        let body = match step {
            Step::Pending(status) => json!({"classification_status": status, "entities": []}),
            Step::Done => {
                let keep = lines.len().saturating_sub(self.drop_entities);
                let entities: Vec<JsonValue> = lines
                    .iter()
                    .take(keep)
                    .enumerate()
                    .map(|(i, line)| entity_for(job_id, i, line))
                    .collect();
                json!({"classification_status": "Done", "entities": entities})
            }
        };
        Ok(body.to_string())
    }

    async fn fetch_by_key(&self, key: &str, _format: ResultFormat) -> AppResult<String> {
        Ok(entity_for("0", 0, key).to_string())
    }
}

/// 写入一个 `name,smiles` 表格，返回行内容
pub fn write_table(path: &std::path::Path, rows: usize) -> Vec<(String, String)> {
    let data: Vec<(String, String)> = (0..rows)
        .map(|i| (format!("cpd{}", i), format!("C{}O", "C".repeat(i % 7))))
        .collect();

    let mut content = String::from("name,smiles\n");
    for (name, smiles) in &data {
        content.push_str(&format!("{},{}\n", name, smiles));
    }
    std::fs::write(path, content).unwrap();
    data
}
