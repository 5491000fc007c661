//! Project DTOs

use serde::{Deserialize, Serialize};

/// Project as returned by the projects API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub path_with_namespace: String,
}
