//! Systems: named, prioritized units of per-tick behavior.
//!
//! A [`System`] declares the component kinds (and optionally tags) an entity must have to be
//! included in its query, and a closure invoked once per tick with a [`Context`] and the query
//! [`Result`](query::Result) computed just before it runs:
//!
//! ```rust,ignore
//! use cadence_engine::ecs::System;
//!
//! let movement = System::new("movement", 0, |ctx, matched| {
//!     let dt = ctx.delta() as f32;
//!     for entity in matched {
//!         let Some(&Velocity { dx, dy }) = ctx.get::<Velocity>(entity) else { continue };
//!         if let Some(pos) = ctx.get_mut::<Position>(entity) {
//!             pos.x += dx * dt;
//!             pos.y += dy * dt;
//!         }
//!     }
//! })
//! .requires::<(Position, Velocity)>();
//! ```
//!
//! A system with no requirements receives an empty result, which suits global or singleton work.

mod command;
mod context;

use std::{borrow::Cow, fmt};

pub use command::{Command, CommandBuffer, InsertFn, RemoveFn};
pub use context::Context;

use crate::ecs::{
    component::{self, IntoSpec, Spec},
    entity::Tag,
    query,
};

/// Identifies a registered system within its scheduler. Assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// The function body of a system.
pub type RunFn = Box<dyn FnMut(&mut Context<'_>, &query::Result)>;

/// Resolves a system's component requirements against a world's registry.
type SpecFn = fn(&component::Registry) -> Spec;

/// A named unit of behavior with a priority and component requirements. Lower priorities run
/// first.
pub struct System {
    name: Cow<'static, str>,
    priority: i32,
    spec: SpecFn,
    tags: Vec<Tag>,
    run: RunFn,
}

impl System {
    /// Create a system with no component requirements.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, priority: i32, run: F) -> Self
    where
        F: FnMut(&mut Context<'_>, &query::Result) + 'static,
    {
        Self {
            name: name.into(),
            priority,
            spec: |_| Spec::EMPTY,
            tags: Vec::new(),
            run: Box::new(run),
        }
    }

    /// Require every component kind of `S`.
    pub fn requires<S: IntoSpec>(mut self) -> Self {
        self.spec = component::Registry::spec::<S>;
        self
    }

    /// Require every tag.
    pub fn tagged(mut self, tags: impl IntoIterator<Item = impl Into<Tag>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Resolve the component requirements, registering any kinds not yet known.
    pub fn spec(&self, registry: &component::Registry) -> Spec {
        (self.spec)(registry)
    }

    pub(crate) fn run(&mut self, ctx: &mut Context<'_>, matched: &query::Result) {
        (self.run)(ctx, matched)
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}
