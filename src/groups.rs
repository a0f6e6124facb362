//! Local VM group store.
//!
//! Groups are a pure client-side organizational layer persisted as JSON
//! in the data directory. A well-known `no-group` bucket always exists
//! and receives the members of any removed group — reassignment fully
//! completes before the group is deleted.

use std::path::{Path, PathBuf};

use facet::Facet;

use crate::error::ForgeError;

/// Id of the default bucket for ungrouped machines.
pub const NO_GROUP_ID: &str = "no-group";
pub const NO_GROUP_NAME: &str = "No group";

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub machines: Vec<String>,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct GroupsFile {
    groups: Vec<Group>,
}

pub struct GroupStore {
    path: PathBuf,
    groups: Vec<Group>,
}

fn slugify(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

impl GroupStore {
    /// Load the store, creating the default bucket if it is missing.
    /// A missing file is an empty store, not an error.
    pub fn load(path: &Path) -> Result<Self, ForgeError> {
        let mut groups = match std::fs::read_to_string(path) {
            Ok(contents) => {
                let file: GroupsFile =
                    facet_json::from_str(&contents).map_err(|e| ForgeError::GroupStore {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })?;
                file.groups
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(ForgeError::Io {
                    context: format!("reading group store {}", path.display()),
                    source,
                });
            }
        };

        if !groups.iter().any(|g| g.id == NO_GROUP_ID) {
            groups.insert(
                0,
                Group {
                    id: NO_GROUP_ID.into(),
                    name: NO_GROUP_NAME.into(),
                    machines: Vec::new(),
                },
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            groups,
        })
    }

    pub fn save(&self) -> Result<(), ForgeError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ForgeError::Io {
                context: format!("creating data dir {}", parent.display()),
                source,
            })?;
        }
        let file = GroupsFile {
            groups: self.groups.clone(),
        };
        let json = facet_json::to_string(&file).map_err(|e| ForgeError::GroupStore {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, json).map_err(|source| ForgeError::Io {
            context: format!("writing group store {}", self.path.display()),
            source,
        })
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn get_group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Create a group named `name`; its id is a slug of the name.
    pub fn create_group(&mut self, name: &str) -> Result<&Group, ForgeError> {
        let id = slugify(name);
        if id.is_empty() {
            return Err(ForgeError::Validation {
                message: format!("group name '{name}' produces an empty id"),
            });
        }
        if self.get_group(&id).is_some() {
            return Err(ForgeError::Validation {
                message: format!("group '{id}' already exists"),
            });
        }
        self.groups.push(Group {
            id,
            name: name.trim().to_string(),
            machines: Vec::new(),
        });
        Ok(self.groups.last().expect("just pushed"))
    }

    /// Move a machine into `group_id`, removing it from every other
    /// group first — a machine belongs to at most one group.
    pub fn add_vm_to_group(&mut self, group_id: &str, vm: &str) -> Result<(), ForgeError> {
        if self.get_group(group_id).is_none() {
            return Err(ForgeError::Validation {
                message: format!("no such group '{group_id}'"),
            });
        }
        for group in &mut self.groups {
            group.machines.retain(|m| m != vm);
        }
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id == group_id)
            .expect("checked above");
        group.machines.push(vm.to_string());
        Ok(())
    }

    /// Remove a group after moving all its machines to the default
    /// bucket. Returns `false` (a no-op, not an error) when the id does
    /// not exist. The default bucket itself cannot be removed.
    pub fn remove_group(&mut self, id: &str) -> Result<bool, ForgeError> {
        if id == NO_GROUP_ID {
            return Err(ForgeError::Validation {
                message: format!("the '{NO_GROUP_ID}' bucket cannot be removed"),
            });
        }
        let Some(pos) = self.groups.iter().position(|g| g.id == id) else {
            return Ok(false);
        };

        // Reassign before delete — members must never be lost, even if a
        // save between the two steps fails.
        let machines = std::mem::take(&mut self.groups[pos].machines);
        let no_group = self
            .groups
            .iter_mut()
            .find(|g| g.id == NO_GROUP_ID)
            .expect("default bucket exists after load");
        no_group.machines.extend(machines);

        self.groups.retain(|g| g.id != id);
        Ok(true)
    }
}
