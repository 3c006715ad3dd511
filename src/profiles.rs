//! Durable storage of credential profiles and the active-profile
//! selection, plus the legacy single-credential preference source.
//!
//! State lives in a root directory as pretty-printed JSON, written
//! atomically. The store follows an explicit load-on-start /
//! persist-on-write lifecycle: every accessor answers from memory and
//! every mutator rewrites the file before returning.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::Profile;

const PROFILES_FILE: &str = "profiles.json";
const PREFERENCES_FILE: &str = "preferences.json";
const STORE_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    pub version: u32,

    #[serde(default)]
    pub profiles: Vec<Profile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_profile_id: Option<String>,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            version: STORE_VERSION,
            profiles: Vec::new(),
            active_profile_id: None,
        }
    }
}

/// Legacy single-credential fallback, sourced from an older preference
/// file. Read-only here except for `ensure_default_profile` seeding.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub default_scope: Option<String>,
}

struct Loaded {
    data: ProfileData,
    preferences: Preferences,
}

pub struct ProfileStore {
    root: PathBuf,
    state: Mutex<Option<Loaded>>,
}

impl ProfileStore {
    /// Opens a store rooted at `root` without reading it; the store is not
    /// ready until `load` completes.
    pub fn open(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            state: Mutex::new(None),
        }
    }

    pub fn load(&self) -> Result<(), StoreError> {
        let data = self.read_profiles()?;
        let preferences = self.read_preferences()?;
        *self.state.lock().unwrap() = Some(Loaded { data, preferences });
        Ok(())
    }

    /// False until the initial `load` has completed.
    pub fn is_ready(&self) -> bool {
        self.state.lock().unwrap().is_some()
    }

    pub fn profiles(&self) -> Result<Vec<Profile>, StoreError> {
        self.with_loaded(|l| Ok(l.data.profiles.clone()))
    }

    pub fn active_profile_id(&self) -> Result<Option<String>, StoreError> {
        self.with_loaded(|l| Ok(l.data.active_profile_id.clone()))
    }

    pub fn preferences(&self) -> Result<Preferences, StoreError> {
        self.with_loaded(|l| Ok(l.preferences.clone()))
    }

    /// Snapshot of the loaded state for the resolver; `None` until ready.
    pub(crate) fn loaded(&self) -> Option<(ProfileData, Preferences)> {
        let guard = self.state.lock().unwrap();
        guard
            .as_ref()
            .map(|l| (l.data.clone(), l.preferences.clone()))
    }

    pub fn set_profiles(&self, profiles: Vec<Profile>) -> Result<(), StoreError> {
        for (i, p) in profiles.iter().enumerate() {
            if profiles[..i].iter().any(|q| q.id == p.id) {
                return Err(StoreError::DuplicateProfileId(p.id.clone()));
            }
        }
        self.update(|data| {
            data.profiles = profiles;
            Ok(())
        })
    }

    /// Creates a profile with a fresh uuid-v4 id, persists it, and returns
    /// it.
    pub fn add_profile(
        &self,
        name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Profile, StoreError> {
        let profile = Profile {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            api_key: api_key.into(),
            default_scope: None,
            default_scope_name: None,
        };
        let out = profile.clone();
        self.update(move |data| {
            data.profiles.push(profile);
            Ok(())
        })?;
        Ok(out)
    }

    pub fn set_active_profile_id(&self, id: Option<String>) -> Result<(), StoreError> {
        self.update(|data| {
            data.active_profile_id = id;
            Ok(())
        })
    }

    pub fn set_default_scope(
        &self,
        profile_id: &str,
        scope: Option<String>,
        scope_name: Option<String>,
    ) -> Result<(), StoreError> {
        let profile_id = profile_id.to_string();
        self.update(move |data| {
            let profile = data
                .profiles
                .iter_mut()
                .find(|p| p.id == profile_id)
                .ok_or_else(|| StoreError::UnknownProfileId(profile_id.clone()))?;
            profile.default_scope = scope;
            profile.default_scope_name = scope_name;
            Ok(())
        })
    }

    /// Seeds a "Default" profile from the legacy preference credential when
    /// the profile list is empty, and marks it active. No-op otherwise.
    /// Returns the seeded profile if one was created.
    pub fn ensure_default_profile(&self) -> Result<Option<Profile>, StoreError> {
        let (data, prefs) = {
            let guard = self.state.lock().unwrap();
            let loaded = guard.as_ref().ok_or(StoreError::NotLoaded)?;
            (loaded.data.clone(), loaded.preferences.clone())
        };
        if !data.profiles.is_empty() {
            return Ok(None);
        }
        let Some(api_key) = prefs.api_key.filter(|k| !k.is_empty()) else {
            return Ok(None);
        };

        log::debug!("seeding default profile from legacy preference credential");
        let profile = Profile {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Default".to_string(),
            api_key,
            default_scope: prefs.default_scope.filter(|s| !s.is_empty()),
            default_scope_name: None,
        };
        let out = profile.clone();
        self.update(move |data| {
            data.profiles.push(profile.clone());
            data.active_profile_id = Some(profile.id.clone());
            Ok(())
        })?;
        Ok(Some(out))
    }

    fn with_loaded<T>(
        &self,
        f: impl FnOnce(&Loaded) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let guard = self.state.lock().unwrap();
        let loaded = guard.as_ref().ok_or(StoreError::NotLoaded)?;
        f(loaded)
    }

    /// Applies `f` to the in-memory state and persists the result. The
    /// in-memory copy is only replaced once the write succeeds.
    fn update(
        &self,
        f: impl FnOnce(&mut ProfileData) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut guard = self.state.lock().unwrap();
        let loaded = guard.as_mut().ok_or(StoreError::NotLoaded)?;
        let mut next = loaded.data.clone();
        f(&mut next)?;
        self.write_profiles(&next)?;
        loaded.data = next;
        Ok(())
    }

    fn read_profiles(&self) -> Result<ProfileData, StoreError> {
        let path = self.root.join(PROFILES_FILE);
        if !path.exists() {
            return Ok(ProfileData::default());
        }
        let bytes = fs::read(&path).map_err(|e| StoreError::io("read profiles.json", e))?;
        let data: ProfileData =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::format("parse profiles.json", e))?;
        if data.version != STORE_VERSION {
            return Err(StoreError::Version(data.version));
        }
        Ok(data)
    }

    fn write_profiles(&self, data: &ProfileData) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(data)
            .map_err(|e| StoreError::format("serialize profiles", e))?;
        write_atomic(&self.root.join(PROFILES_FILE), &bytes)
    }

    fn read_preferences(&self) -> Result<Preferences, StoreError> {
        let path = self.root.join(PREFERENCES_FILE);
        if !path.exists() {
            return Ok(Preferences::default());
        }
        let bytes = fs::read(&path).map_err(|e| StoreError::io("read preferences.json", e))?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::format("parse preferences.json", e))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::io("create parent directories", e))?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes)
        .map_err(|e| StoreError::io(format!("write temp file {}", tmp.display()), e))?;
    fs::rename(&tmp, path)
        .map_err(|e| StoreError::io(format!("rename {} -> {}", tmp.display(), path.display()), e))?;
    Ok(())
}
