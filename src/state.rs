use std::sync::Arc;

use crate::config::AppConfig;
use crate::planner::service::{MealPlanner, ScriptPlanner};
use crate::users::store::{JsonFileStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub planner: Arc<dyn MealPlanner>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store =
            Arc::new(JsonFileStore::open(&config.users_db_path).await?) as Arc<dyn UserStore>;
        let planner = Arc::new(ScriptPlanner::new(
            config.python_bin.clone(),
            config.planner_script.clone(),
        )) as Arc<dyn MealPlanner>;

        Ok(Self {
            store,
            planner,
            config,
        })
    }

    pub fn from_parts(
        store: Arc<dyn UserStore>,
        planner: Arc<dyn MealPlanner>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            planner,
            config,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::error::PlannerError;
        use crate::planner::service::MealPlanRequest;
        use crate::users::store::MemoryStore;
        use async_trait::async_trait;
        use serde_json::{json, Value};

        struct CannedPlanner;

        #[async_trait]
        impl MealPlanner for CannedPlanner {
            async fn plan(&self, req: &MealPlanRequest) -> Result<Value, PlannerError> {
                Ok(json!({
                    "meals": [{"name": "oatmeal", "hall": req.dining_hall}],
                    "total_calories": req.calories,
                }))
            }
        }

        Self {
            store: Arc::new(MemoryStore::default()),
            planner: Arc::new(CannedPlanner),
            config: Arc::new(AppConfig::default()),
        }
    }
}
