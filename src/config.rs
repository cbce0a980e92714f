use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub users_db_path: PathBuf,
    pub planner_script: PathBuf,
    pub python_bin: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            users_db_path: std::env::var("USERS_DB_PATH")
                .unwrap_or_else(|_| "data/users.json".into())
                .into(),
            planner_script: std::env::var("MEAL_PLANNER_SCRIPT")
                .unwrap_or_else(|_| "meal-planning/meal_planner.py".into())
                .into(),
            python_bin: std::env::var("PYTHON_BIN").unwrap_or_else(|_| "python3".into()),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            users_db_path: "data/users.json".into(),
            planner_script: "meal-planning/meal_planner.py".into(),
            python_bin: "python3".into(),
        }
    }
}
