use crate::models::WeeklySeries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const DATASET_LABEL: &str = "Calories Consumed";
pub const BAR_FILL: &str = "rgba(39, 174, 96, 0.8)";
pub const BAR_BORDER: &str = "rgba(39, 174, 96, 1)";

/// Chart.js configuration for the weekly calorie bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: &'static str,
    pub data: Vec<f64>,
    pub background_color: Vec<&'static str>,
    pub border_color: Vec<&'static str>,
    pub border_width: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub y: ValueAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxis {
    pub begin_at_zero: bool,
}

impl ChartConfig {
    pub fn weekly_bars(series: &WeeklySeries) -> Self {
        let bars = series.labels.len();
        Self {
            kind: "bar",
            data: ChartData {
                labels: series.labels.clone(),
                datasets: vec![Dataset {
                    label: DATASET_LABEL,
                    data: series.values.clone(),
                    background_color: vec![BAR_FILL; bars],
                    border_color: vec![BAR_BORDER; bars],
                    border_width: 1,
                }],
            },
            options: ChartOptions {
                scales: Scales {
                    y: ValueAxis { begin_at_zero: true },
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub id: u64,
    pub config: ChartConfig,
    pub created_at: DateTime<Utc>,
}

/// What the page needs to redraw: the new instance and the one it replaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSnapshot {
    pub id: u64,
    pub replaces: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub config: ChartConfig,
}

/// Owner of the single live chart instance on the calorie canvas.
#[derive(Debug, Default)]
pub struct ChartManager {
    current: Option<ChartInstance>,
    next_id: u64,
}

impl ChartManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&ChartInstance> {
        self.current.as_ref()
    }

    /// Destroys the live instance, if any, then draws a new one.
    pub fn render(&mut self, series: &WeeklySeries) -> ChartSnapshot {
        let replaces = self.current.take().map(|old| {
            debug!(chart_id = old.id, "destroying previous chart");
            old.id
        });

        self.next_id += 1;
        let instance = ChartInstance {
            id: self.next_id,
            config: ChartConfig::weekly_bars(series),
            created_at: Utc::now(),
        };
        debug!(
            chart_id = instance.id,
            bars = series.labels.len(),
            created_at = %instance.created_at,
            "created chart"
        );

        let snapshot = ChartSnapshot {
            id: instance.id,
            replaces,
            created_at: instance.created_at,
            config: instance.config.clone(),
        };
        self.current = Some(instance);
        snapshot
    }
}

pub const MAX_CHART_SESSIONS: usize = 1024;

struct Session {
    manager: Arc<Mutex<ChartManager>>,
    last_used: DateTime<Utc>,
}

/// One `ChartManager` per page load. The page gets its session id with the
/// markup and sends it back on every dispatch that may redraw the chart.
#[derive(Default)]
pub struct ChartSessions {
    sessions: Mutex<HashMap<String, Session>>,
    issued: Mutex<u64>,
    max_sessions: usize,
}

impl ChartSessions {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CHART_SESSIONS)
    }

    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            max_sessions: max_sessions.max(1),
            ..Self::default()
        }
    }

    /// Issues a fresh session id.
    pub async fn open(&self) -> String {
        let mut issued = self.issued.lock().await;
        *issued += 1;
        format!("{:x}-{:x}", Utc::now().timestamp_micros(), *issued)
    }

    /// Manager for `session`, created on first use. Requests without a
    /// session get a manager nobody else sees.
    pub async fn manager(&self, session: Option<&str>) -> Arc<Mutex<ChartManager>> {
        let Some(session) = session else {
            return Arc::new(Mutex::new(ChartManager::new()));
        };

        let mut sessions = self.sessions.lock().await;
        let now = Utc::now();
        if let Some(entry) = sessions.get_mut(session) {
            entry.last_used = now;
            return Arc::clone(&entry.manager);
        }

        if sessions.len() >= self.max_sessions {
            let stale = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| id.clone());
            if let Some(stale) = stale {
                info!(session = %stale, "evicting least recently used chart session");
                sessions.remove(&stale);
            }
        }

        let manager = Arc::new(Mutex::new(ChartManager::new()));
        sessions.insert(
            session.to_string(),
            Session {
                manager: Arc::clone(&manager),
                last_used: now,
            },
        );
        manager
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
