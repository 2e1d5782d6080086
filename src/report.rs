use crate::Result;
use crate::http::Status;
use crate::runner::{ProbeRecord, Tally};
use crate::suite::SuiteStatus;
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use serde::Serialize;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// 一次完整运行的结果
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub base_url: String,
    pub status: SuiteStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub probes: Vec<ProbeRecord>,
}

impl RunReport {
    pub fn new(
        base_url: String,
        status: SuiteStatus,
        tally: Tally,
        probes: Vec<ProbeRecord>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            base_url,
            status,
            started_at,
            finished_at,
            total: tally.attempted(),
            passed: tally.passed(),
            failed: tally.failed(),
            success_rate: (tally.success_rate() * 10.0).round() / 10.0,
            probes,
        }
    }

    /// 进程退出码：仅当运行完成且全部探测通过时为 0
    pub fn exit_code(&self) -> i32 {
        match self.status {
            SuiteStatus::Completed if self.passed == self.total => 0,
            _ => 1,
        }
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec![
            "#", "Probe", "Method", "URL", "Expected", "Actual", "Result", "Duration",
        ]);

        for probe in &self.probes {
            let (result, color) = if probe.success {
                ("PASS", Color::Green)
            } else {
                ("FAIL", Color::Red)
            };
            let actual = probe
                .actual_status
                .map(|code| Status::new(code).to_string())
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                Cell::new(probe.number),
                Cell::new(&probe.name),
                Cell::new(&probe.method),
                Cell::new(&probe.url).add_attribute(Attribute::Dim),
                Cell::new(probe.expected_status),
                Cell::new(actual).fg(color),
                Cell::new(result).fg(color),
                Cell::new(format!("{}ms", probe.duration_ms)),
            ]);
        }

        table
    }
}
