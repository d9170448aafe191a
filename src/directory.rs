//! Skill directory seam.
//!
//! The skill catalogue (titles, descriptions, search) is an external
//! collaborator; the core only ever needs to map a skill reference to its
//! owning mentor when a session is created. This module defines that seam
//! plus an in-memory implementation for tests and a file-backed one for
//! the CLI.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapError};

/// The slice of a skill record the core cares about.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillRecord {
    /// Skill identifier.
    pub skill_id: String,
    /// The user who offers this skill.
    pub mentor_id: String,
}

/// Maps a skill reference to its owning mentor.
pub trait SkillDirectory: Send + Sync {
    /// Resolve a skill reference.
    ///
    /// Fails `NotFound` if no such skill exists.
    fn resolve(&self, skill_ref: &str) -> Result<SkillRecord>;
}

impl<T: SkillDirectory + ?Sized> SkillDirectory for Arc<T> {
    fn resolve(&self, skill_ref: &str) -> Result<SkillRecord> {
        (**self).resolve(skill_ref)
    }
}

/// In-memory skill directory.
#[derive(Debug, Default)]
pub struct MemorySkillDirectory {
    skills: RwLock<HashMap<String, SkillRecord>>,
}

impl MemorySkillDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skill with its owning mentor.
    pub fn add(&self, skill_id: impl Into<String>, mentor_id: impl Into<String>) {
        let skill_id = skill_id.into();
        let record = SkillRecord {
            skill_id: skill_id.clone(),
            mentor_id: mentor_id.into(),
        };
        self.skills.write().unwrap().insert(skill_id, record);
    }
}

impl SkillDirectory for MemorySkillDirectory {
    fn resolve(&self, skill_ref: &str) -> Result<SkillRecord> {
        self.skills
            .read()
            .unwrap()
            .get(skill_ref)
            .cloned()
            .ok_or_else(|| SwapError::not_found("skill", skill_ref))
    }
}

/// File-backed skill directory used by the CLI.
///
/// The whole registry lives in one JSON file (`skills.json`), rewritten
/// atomically on every add. Fine at CLI scale.
#[derive(Debug)]
pub struct FileSkillDirectory {
    path: PathBuf,
}

impl FileSkillDirectory {
    /// Open (or lazily create) the registry at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, SkillRecord>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| SwapError::storage(&self.path, e))?;
        let skills: HashMap<String, SkillRecord> = serde_json::from_str(&content)?;
        Ok(skills)
    }

    /// Register a skill and persist the registry.
    pub fn add(&self, skill_id: impl Into<String>, mentor_id: impl Into<String>) -> Result<()> {
        let skill_id = skill_id.into();
        let mut skills = self.read_all()?;
        skills.insert(
            skill_id.clone(),
            SkillRecord {
                skill_id,
                mentor_id: mentor_id.into(),
            },
        );

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SwapError::storage(parent, e))?;
            }
        }
        let json = serde_json::to_string_pretty(&skills)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json).map_err(|e| SwapError::storage(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| SwapError::storage(&self.path, e))?;
        Ok(())
    }
}

impl SkillDirectory for FileSkillDirectory {
    fn resolve(&self, skill_ref: &str) -> Result<SkillRecord> {
        self.read_all()?
            .remove(skill_ref)
            .ok_or_else(|| SwapError::not_found("skill", skill_ref))
    }
}
