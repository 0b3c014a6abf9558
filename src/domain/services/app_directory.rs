#[cfg(test)]
#[path = "app_directory_test.rs"]
mod tests;

use chrono::Utc;

use crate::domain::models::create_id;
use crate::domain::models::normalize_aliases;
use crate::domain::models::validate_display_name;
use crate::domain::models::validate_url;
use crate::domain::models::MutationError;
use crate::domain::models::PersistenceError;
use crate::domain::models::SavedApp;
use crate::domain::models::StoreBox;
use crate::domain::models::ValidationError;

pub const APPS_KEY: &str = "jarvis_saved_apps";

/// Fields left as `None` are kept as they are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppUpdate {
    pub display_name: Option<String>,
    pub url: Option<String>,
    pub aliases: Option<Vec<String>>,
}

/// Persisted registry of user defined launch targets. Apps are kept in
/// insertion order, which is also the tie-break order for name lookups.
pub struct AppDirectory {
    store: StoreBox,
    apps: Vec<SavedApp>,
}

impl AppDirectory {
    pub fn load(store: StoreBox) -> AppDirectory {
        let apps = match store.get(APPS_KEY) {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<SavedApp>>(&payload) {
                Ok(apps) => apps,
                Err(err) => {
                    tracing::warn!(error = ?err, "Stored apps are malformed, starting empty");
                    vec![]
                }
            },
            Ok(None) => vec![],
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to read stored apps, starting empty");
                vec![]
            }
        };

        return AppDirectory { store, apps };
    }

    pub fn list(&self) -> &[SavedApp] {
        return &self.apps;
    }

    pub fn get(&self, id: &str) -> Option<&SavedApp> {
        return self.apps.iter().find(|e| return e.id == id);
    }

    pub fn add(
        &mut self,
        display_name: &str,
        url: &str,
        aliases: &[String],
    ) -> Result<SavedApp, MutationError> {
        let mut app = SavedApp::new(display_name, url, aliases, Utc::now().timestamp_millis())?;
        while self.get(&app.id).is_some() {
            app.id = create_id("app");
        }

        let mut next = self.apps.clone();
        next.push(app.clone());
        self.persist(&next)?;
        self.apps = next;

        tracing::debug!(id = app.id, name = app.display_name, "Saved app");
        return Ok(app);
    }

    pub fn update(&mut self, id: &str, changes: AppUpdate) -> Result<SavedApp, MutationError> {
        let idx = self
            .apps
            .iter()
            .position(|e| return e.id == id)
            .ok_or_else(|| return ValidationError::UnknownApp(id.to_string()))?;

        let mut app = self.apps[idx].clone();
        if let Some(display_name) = changes.display_name {
            app.display_name = validate_display_name(&display_name)?;
        }
        if let Some(url) = changes.url {
            app.url = validate_url(&url)?;
        }
        if let Some(aliases) = changes.aliases {
            app.aliases = normalize_aliases(&aliases);
        }

        let mut next = self.apps.clone();
        next[idx] = app.clone();
        self.persist(&next)?;
        self.apps = next;

        return Ok(app);
    }

    /// Removing an unknown id is a no-op and does not touch the store.
    pub fn remove(&mut self, id: &str) -> Result<(), PersistenceError> {
        if self.get(id).is_none() {
            return Ok(());
        }

        let next = self
            .apps
            .iter()
            .filter(|e| return e.id != id)
            .cloned()
            .collect::<Vec<SavedApp>>();
        self.persist(&next)?;
        self.apps = next;

        return Ok(());
    }

    pub fn find_by_name(&self, query: &str) -> Option<&SavedApp> {
        return self.find_by_name_where(query, |_| return true);
    }

    /// Case-insensitive lookup in priority order: exact display name, exact
    /// alias, then a substring match in either direction against the display
    /// name. Within a level the first app in insertion order wins.
    pub fn find_by_name_where<F>(&self, query: &str, predicate: F) -> Option<&SavedApp>
    where
        F: Fn(&SavedApp) -> bool,
    {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let candidates = self
            .apps
            .iter()
            .filter(|e| return predicate(e))
            .collect::<Vec<&SavedApp>>();

        if let Some(app) = candidates
            .iter()
            .find(|e| return e.display_name.to_lowercase() == query)
        {
            return Some(*app);
        }

        if let Some(app) = candidates.iter().find(|e| {
            return e.aliases.iter().any(|alias| return alias.to_lowercase() == query);
        }) {
            return Some(*app);
        }

        return candidates.into_iter().find(|e| {
            let name = e.display_name.trim().to_lowercase();
            return !name.is_empty() && (query.contains(&name) || name.contains(&query));
        });
    }

    fn persist(&self, apps: &[SavedApp]) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string(apps).map_err(|err| {
            return PersistenceError::Serialize {
                key: APPS_KEY.to_string(),
                reason: err.to_string(),
            };
        })?;

        return self.store.set(APPS_KEY, &payload);
    }
}
