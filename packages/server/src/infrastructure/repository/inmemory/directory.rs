//! InMemory group/user directory 実装
//!
//! MembershipDirectory と UserDirectory の両方を 1 つの構造体で実装します。
//! 開発用サーバーでは JSON ファイルから初期データを読み込みます。

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::{
    domain::{DirectoryError, MembershipDirectory, SubjectId, UserDirectory},
    error::ServerError,
};

/// On-disk directory seed
///
/// ```json
/// { "groups": { "group-1": ["alice", "carol"] }, "users": { "alice": "Alice" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DirectoryFile {
    #[serde(default)]
    pub groups: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub users: HashMap<String, String>,
}

impl DirectoryFile {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub async fn load(path: &Path) -> Result<Self, ServerError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ServerError::DirectoryFile {
                path: path.display().to_string(),
                source: source.into(),
            })?;
        Self::from_json(&raw).map_err(|source| ServerError::DirectoryFile {
            path: path.display().to_string(),
            source: source.into(),
        })
    }
}

/// インメモリ directory 実装
#[derive(Default)]
pub struct InMemoryDirectory {
    groups: RwLock<HashMap<String, HashSet<String>>>,
    users: RwLock<HashMap<String, String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(file: DirectoryFile) -> Self {
        let groups = file
            .groups
            .into_iter()
            .map(|(group, members)| (group, members.into_iter().collect()))
            .collect();
        Self {
            groups: RwLock::new(groups),
            users: RwLock::new(file.users),
        }
    }

    pub async fn add_member(&self, group_id: &str, subject_id: &str) {
        let mut groups = self.groups.write().await;
        groups
            .entry(group_id.to_string())
            .or_default()
            .insert(subject_id.to_string());
    }

    pub async fn set_display_name(&self, subject_id: &str, name: &str) {
        let mut users = self.users.write().await;
        users.insert(subject_id.to_string(), name.to_string());
    }

    pub async fn group_count(&self) -> usize {
        self.groups.read().await.len()
    }
}

#[async_trait]
impl MembershipDirectory for InMemoryDirectory {
    async fn is_member(
        &self,
        subject_id: &SubjectId,
        group_id: &str,
    ) -> Result<bool, DirectoryError> {
        let groups = self.groups.read().await;
        Ok(groups
            .get(group_id)
            .is_some_and(|members| members.contains(subject_id.as_str())))
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn display_name(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Option<String>, DirectoryError> {
        let users = self.users.read().await;
        Ok(users.get(subject_id.as_str()).cloned())
    }
}
