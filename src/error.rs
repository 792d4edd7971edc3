// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::fmt;

use crate::entity::EntityId;

/// ECS error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A required collaborator was not supplied
    ArgumentNull(&'static str),

    /// Entity id is already tracked by the world
    DuplicateEntity(EntityId),

    /// Entity id is not tracked by the world
    EntityNotFound(EntityId),

    /// Component type is not present on the entity
    ComponentNotFound(&'static str),

    /// Component type is already present on the entity
    ComponentAlreadyPresent(&'static str),

    /// System type is already registered with the world
    SystemAlreadyRegistered(&'static str),

    /// Resolver has no factory for the requested system type
    SystemNotRegistered(&'static str),

    /// Resource type is missing from the context
    ResourceNotFound(&'static str),

    /// Configuration failed to parse or validate
    InvalidConfig(String),

    /// IO error (config files, log directories)
    IoError(String),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::ArgumentNull(name) => write!(f, "Required argument is missing: {name}"),
            EcsError::DuplicateEntity(id) => write!(f, "Entity already exists: {id}"),
            EcsError::EntityNotFound(id) => write!(f, "Entity not found: {id}"),
            EcsError::ComponentNotFound(name) => write!(f, "Component not found: {name}"),
            EcsError::ComponentAlreadyPresent(name) => {
                write!(f, "Component already present: {name}")
            }
            EcsError::SystemAlreadyRegistered(name) => {
                write!(f, "System already registered: {name}")
            }
            EcsError::SystemNotRegistered(name) => {
                write!(f, "No factory registered for system: {name}")
            }
            EcsError::ResourceNotFound(name) => write!(f, "Resource not found: {name}"),
            EcsError::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
            EcsError::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<std::io::Error> for EcsError {
    fn from(err: std::io::Error) -> Self {
        EcsError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EcsError {
    fn from(err: serde_json::Error) -> Self {
        EcsError::InvalidConfig(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
