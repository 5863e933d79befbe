use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lumina_core::{paths, ConfigError, MaskedSettings, Settings, SettingsUpdate};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

use crate::session::{ProjectSession, DEFAULT_PROJECT_ID};

/// Cancellation handle for the turn currently running on a project.
#[derive(Debug, Clone)]
pub struct ActiveTurn {
    pub id: u64,
    pub cancel_token: CancellationToken,
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<RwLock<Settings>>,
    settings_path: PathBuf,
    pub projects: Arc<RwLock<HashMap<String, Arc<Mutex<ProjectSession>>>>>,
    pub active_turns: Arc<RwLock<HashMap<String, ActiveTurn>>>,
    next_turn_id: Arc<AtomicU64>,
}

impl AppState {
    /// The `default` project exists from the start so a preview can pull it
    /// before the first chat.
    pub fn new(settings: Settings, settings_path: PathBuf) -> Self {
        let mut projects = HashMap::new();
        projects.insert(
            DEFAULT_PROJECT_ID.to_string(),
            Arc::new(Mutex::new(ProjectSession::new(DEFAULT_PROJECT_ID))),
        );

        Self {
            settings: Arc::new(RwLock::new(settings)),
            settings_path,
            projects: Arc::new(RwLock::new(projects)),
            active_turns: Arc::new(RwLock::new(HashMap::new())),
            next_turn_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// State backed by `settings.json` in `data_dir`, or the default data dir.
    pub fn load(data_dir: Option<PathBuf>) -> Self {
        let settings_path = data_dir
            .map(|dir| dir.join("settings.json"))
            .unwrap_or_else(paths::settings_json_path);
        let settings = Settings::load_from(&settings_path);
        log::info!(
            "Loaded settings from {:?} (provider: {}, model: {}, api key set: {})",
            settings_path,
            settings.provider,
            settings.model,
            settings.has_api_key()
        );
        Self::new(settings, settings_path)
    }

    pub async fn settings_snapshot(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn masked_settings(&self) -> MaskedSettings {
        self.settings.read().await.masked()
    }

    /// Apply a partial update and persist it.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<MaskedSettings, ConfigError> {
        let mut settings = self.settings.write().await;
        let mut updated = settings.clone();
        updated.apply_update(update);
        updated.save_to(&self.settings_path)?;
        *settings = updated;
        log::info!("Settings saved to {:?}", self.settings_path);
        Ok(settings.masked())
    }

    /// Session for `project_id` if a chat or an import already created it.
    pub async fn existing_project(&self, project_id: &str) -> Option<Arc<Mutex<ProjectSession>>> {
        self.projects.read().await.get(project_id).cloned()
    }

    /// Session for `project_id`, created and seeded on first use.
    pub async fn project(&self, project_id: &str) -> Arc<Mutex<ProjectSession>> {
        if let Some(session) = self.projects.read().await.get(project_id) {
            return session.clone();
        }

        let mut projects = self.projects.write().await;
        projects
            .entry(project_id.to_string())
            .or_insert_with(|| {
                log::info!("[{}] Creating project session", project_id);
                Arc::new(Mutex::new(ProjectSession::new(project_id)))
            })
            .clone()
    }

    /// Register a new turn on `project_id`, cancelling any turn still running
    /// there so a project only ever has one writer.
    pub async fn begin_turn(&self, project_id: &str) -> ActiveTurn {
        let turn = ActiveTurn {
            id: self.next_turn_id.fetch_add(1, Ordering::SeqCst),
            cancel_token: CancellationToken::new(),
        };

        let mut turns = self.active_turns.write().await;
        if let Some(previous) = turns.insert(project_id.to_string(), turn.clone()) {
            log::warn!("[{}] Superseding running turn {}", project_id, previous.id);
            previous.cancel_token.cancel();
        }
        turn
    }

    /// Forget `turn_id` unless a newer turn already replaced it.
    pub async fn end_turn(&self, project_id: &str, turn_id: u64) {
        let mut turns = self.active_turns.write().await;
        if turns.get(project_id).is_some_and(|turn| turn.id == turn_id) {
            turns.remove(project_id);
        }
    }

    /// Cancel the running turn on `project_id`. Returns false when idle.
    pub async fn cancel_turn(&self, project_id: &str) -> bool {
        match self.active_turns.write().await.remove(project_id) {
            Some(turn) => {
                turn.cancel_token.cancel();
                log::info!("[{}] Turn {} cancelled", project_id, turn.id);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(Settings::default(), dir.path().join("settings.json"));
        (state, dir)
    }

    #[tokio::test]
    async fn project_sessions_are_created_once() {
        let (state, _dir) = state();
        let a = state.project("p").await;
        a.lock().await.store_mut().write("x.ts", "1");

        let b = state.project("p").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert!(b.lock().await.store().exists("x.ts"));
    }

    #[tokio::test]
    async fn only_the_default_project_exists_up_front() {
        let (state, _dir) = state();
        assert!(state.existing_project(DEFAULT_PROJECT_ID).await.is_some());
        assert!(state.existing_project("p").await.is_none());
        assert_eq!(state.projects.read().await.len(), 1);

        state.project("p").await;
        assert!(state.existing_project("p").await.is_some());
    }

    #[tokio::test]
    async fn new_turn_supersedes_running_one() {
        let (state, _dir) = state();
        let first = state.begin_turn("p").await;
        let second = state.begin_turn("p").await;

        assert!(first.cancel_token.is_cancelled());
        assert!(!second.cancel_token.is_cancelled());

        state.end_turn("p", first.id).await;
        assert!(state.active_turns.read().await.contains_key("p"));
        state.end_turn("p", second.id).await;
        assert!(!state.active_turns.read().await.contains_key("p"));
    }

    #[tokio::test]
    async fn cancel_turn_reports_idle_projects() {
        let (state, _dir) = state();
        assert!(!state.cancel_turn("p").await);

        let turn = state.begin_turn("p").await;
        assert!(state.cancel_turn("p").await);
        assert!(turn.cancel_token.is_cancelled());
    }

    #[tokio::test]
    async fn settings_update_is_persisted_and_masked() {
        let (state, dir) = state();
        let masked = state
            .update_settings(SettingsUpdate {
                api_key: Some("sk-abcdefgh12345678".to_string()),
                model: Some("gpt-4o".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(masked.api_key_masked, "sk-abcde...5678");
        assert_eq!(masked.model, "gpt-4o");

        let reloaded = Settings::load_from_files(&dir.path().join("settings.json"), &dir.path().join("none.toml"));
        assert_eq!(reloaded.api_key(), "sk-abcdefgh12345678");
    }
}
