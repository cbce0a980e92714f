use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, error};

use crate::error::PlannerError;

/// Parameters forwarded to the meal planner.
#[derive(Debug, Clone)]
pub struct MealPlanRequest {
    pub calories: String,
    pub dining_hall: String,
    pub meal_type: Option<String>,
}

/// Capability interface for the meal-planning collaborator, so tests can
/// swap in a canned implementation.
#[async_trait]
pub trait MealPlanner: Send + Sync {
    async fn plan(&self, req: &MealPlanRequest) -> Result<Value, PlannerError>;
}

/// Runs the external Python meal-planner script and relays its JSON output.
///
/// Output is buffered to process exit; there is no timeout, so a hung script
/// leaves the request pending.
pub struct ScriptPlanner {
    python: String,
    script: PathBuf,
}

impl ScriptPlanner {
    pub fn new(python: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            script: script.into(),
        }
    }
}

#[async_trait]
impl MealPlanner for ScriptPlanner {
    async fn plan(&self, req: &MealPlanRequest) -> Result<Value, PlannerError> {
        let mut cmd = Command::new(&self.python);
        cmd.arg(&self.script)
            .args(["--calories", &req.calories])
            .args(["--hall", &req.dining_hall])
            .arg("--json"); // force JSON-only output
        if let Some(meal) = &req.meal_type {
            cmd.args(["--meal", meal]);
        }

        debug!(script = %self.script.display(), calories = %req.calories,
               hall = %req.dining_hall, "spawning meal planner");
        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            error!(code = ?output.status.code(), stderr = %stderr, "meal planner failed");
            return Err(PlannerError::Failed {
                code: output.status.code(),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        parse_plan_output(&stdout)
    }
}

/// Parse the planner's stdout as JSON. The script should print only JSON
/// under `--json`, but warnings may still precede it, so fall back to the
/// last line before giving up.
pub fn parse_plan_output(raw: &str) -> Result<Value, PlannerError> {
    if let Ok(plan) = serde_json::from_str(raw) {
        return Ok(plan);
    }
    if let Some(last_line) = raw.trim().lines().last() {
        if let Ok(plan) = serde_json::from_str(last_line) {
            return Ok(plan);
        }
    }
    error!("meal planner output is not JSON");
    Err(PlannerError::Unparseable {
        raw: raw.to_string(),
    })
}
