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

//! Final Engine - Entity Component System core
//!
//! Entities carry at most one component per type. Systems bind to one
//! game-loop phase, select entities with `is_match`, and are notified when
//! an entity starts or stops matching. The world dispatches each phase's
//! systems in registration order.

pub mod builtin;
pub mod command;
pub mod component;
pub mod context;
pub mod debug;
pub mod entity;
pub mod error;
pub mod game_loop;
pub mod phase;
pub mod prelude;
#[cfg(feature = "profiling")]
pub mod profiling;
pub mod resolver;
pub mod schedule;
pub mod system;
pub mod time;
pub mod world;


pub use command::*;
pub use component::*;
pub use context::*;
pub use entity::*;
pub use error::*;
pub use game_loop::*;
pub use phase::*;
pub use resolver::*;
pub use schedule::*;
pub use system::*;
pub use world::*;
