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

//! Component, ComponentSet and ComponentBundle traits
//!
//! Components are data attached to entities, one instance per type.
//! Sets describe a group of component types for matching.
//! Bundles attach several components at once.

use std::any::TypeId;

use smallvec::{smallvec, SmallVec};

use crate::entity::Entity;
use crate::error::{EcsError, Result};

/// Maximum number of components supported by set and bundle implementations
pub const MAX_SET_COMPONENTS: usize = 8;

/// Marker trait for components
///
/// Components must be 'static (no borrowed data)
pub trait Component: 'static + Send + Sync {}

/// Automatically implement Component for all valid types
impl<T: 'static + Send + Sync> Component for T {}

/// A group of component types, used by systems to express requirements.
///
/// ```ignore
/// fn is_match(&self, entity: &Entity) -> bool {
///     entity.contains_all::<(TransformComponent, SpriteComponent)>()
/// }
/// ```
pub trait ComponentSet: 'static {
    /// Type ids of every component in the set
    fn type_ids() -> SmallVec<[TypeId; MAX_SET_COMPONENTS]>;

    /// Type names, parallel to `type_ids`
    fn type_names() -> SmallVec<[&'static str; MAX_SET_COMPONENTS]>;
}

/// Several components attached to an entity in one step.
///
/// Insertion is all-or-nothing: if any type is already present on the
/// entity, or appears twice in the bundle, nothing is inserted.
pub trait ComponentBundle: ComponentSet + Send + Sync {
    /// Insert every component into the entity
    fn insert_into(self, entity: &mut Entity) -> Result<()>;
}

/// Verify that none of the set's types are on the entity and that the set has no repeats.
fn check_insertable<S: ComponentSet>(entity: &Entity) -> Result<()> {
    let ids = S::type_ids();
    let names = S::type_names();
    for (i, type_id) in ids.iter().enumerate() {
        if entity.contains_type(*type_id) || ids[..i].contains(type_id) {
            return Err(EcsError::ComponentAlreadyPresent(names[i]));
        }
    }
    Ok(())
}

macro_rules! impl_component_set {
    ($($T:ident),*) => {
        impl<$($T: Component),*> ComponentSet for ($($T,)*) {
            fn type_ids() -> SmallVec<[TypeId; MAX_SET_COMPONENTS]> {
                smallvec![$(TypeId::of::<$T>()),*]
            }

            fn type_names() -> SmallVec<[&'static str; MAX_SET_COMPONENTS]> {
                smallvec![$(std::any::type_name::<$T>()),*]
            }
        }

        impl<$($T: Component),*> ComponentBundle for ($($T,)*) {
            #[allow(non_snake_case)]
            fn insert_into(self, entity: &mut Entity) -> Result<()> {
                check_insertable::<Self>(entity)?;
                let ($($T,)*) = self;
                $(entity.add_component($T)?;)*
                Ok(())
            }
        }
    };
}

// Implement for tuples of 1-8 components
impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);
