//! Natural-language domain input, loaded from YAML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::action::ActionDescription;
use super::types::TypeNode;
use crate::error::{PddlsmithError, Result};

/// Everything the construction loop needs to know about a domain up front.
///
/// ```yaml
/// name: blocksworld
/// description: A robot arm stacks blocks on a table.
/// types:
///   name: object
///   children:
///     - name: block
///       description: a cube that can be stacked
/// actions:
///   - name: pickup
///     description: Pick a clear block up from the table.
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainDescription {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub types: TypeNode,

    /// Actions in the order they are constructed
    pub actions: Vec<ActionDescription>,
}

impl DomainDescription {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let domain: Self = serde_yaml::from_str(content)?;
        domain.check()?;
        Ok(domain)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let domain = Self::from_yaml_str(&content)?;
        log::info!(
            "Loaded domain '{}' with {} actions from {}",
            domain.name,
            domain.actions.len(),
            path.as_ref().display()
        );
        Ok(domain)
    }

    fn check(&self) -> Result<()> {
        if !self.types.is_rooted() {
            return Err(PddlsmithError::Config(format!(
                "type hierarchy must be rooted at 'object', found '{}'",
                self.types.name
            )));
        }
        if self.actions.is_empty() {
            return Err(PddlsmithError::Config(format!("domain '{}' declares no actions", self.name)));
        }
        let mut seen = Vec::new();
        for action in &self.actions {
            if seen.contains(&action.name) {
                return Err(PddlsmithError::Config(format!("action '{}' is declared twice", action.name)));
            }
            seen.push(action.name.clone());
        }
        Ok(())
    }

    pub fn action_names(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.name.clone()).collect()
    }
}
