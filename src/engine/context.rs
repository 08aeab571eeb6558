//! Per-conversion state.

use std::cell::{Cell, RefCell};

use typebridge_types::Value;

use crate::config::Limits;
use crate::dynamic::Dynamic;
use crate::engine::{CycleGuard, Registry};
use crate::error::{Direction, ReflectError, Result};
use crate::format::Formats;

/// Everything a reflector can reach while converting: the registries, the
/// limits and the cycle guard of the top-level call in progress.
///
/// A context is not shared between threads. Nested conversions started from
/// inside a reflector reuse the same context, and therefore the same guard.
pub struct Context<'r> {
    registry: &'r Registry,
    formats: &'r Formats,
    limits: Limits,
    guard: RefCell<Option<CycleGuard>>,
    depth: Cell<usize>,
}

impl Context<'static> {
    /// Context over the global registries with default limits.
    pub fn global() -> Self {
        Context::new(Registry::global(), Formats::global())
    }
}

impl<'r> Context<'r> {
    pub fn new(registry: &'r Registry, formats: &'r Formats) -> Self {
        Self {
            registry,
            formats,
            limits: Limits::default(),
            guard: RefCell::new(None),
            depth: Cell::new(0),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn formats(&self) -> &'r Formats {
        self.formats
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Enter a guarded region.
    ///
    /// Allocates a cycle guard if none is active; the returned scope releases
    /// it again only if this call allocated it.
    pub fn guard(&self) -> GuardScope<'_> {
        let mut slot = self.guard.borrow_mut();
        let owner = slot.is_none();
        if owner {
            *slot = Some(CycleGuard::new());
        }
        GuardScope {
            slot: &self.guard,
            owner,
        }
    }

    /// True while some conversion holds the guard.
    pub fn is_guarded(&self) -> bool {
        self.guard.borrow().is_some()
    }

    /// Enter one level of composite nesting.
    pub fn descend(&self) -> Result<DepthScope<'_>> {
        let next = self.depth.get() + 1;
        if next > self.limits.max_depth {
            return Err(ReflectError::DepthExceeded(self.limits.max_depth));
        }
        self.depth.set(next);
        Ok(DepthScope { depth: &self.depth })
    }

    /// Run a speculative conversion. If it fails, identities it marked are
    /// forgotten so that an alternative conversion of the same input can
    /// proceed.
    pub fn attempt<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let checkpoint = self.guard.borrow().as_ref().map(CycleGuard::checkpoint);
        let depth = self.depth.get();
        let result = f(self);
        if result.is_err() {
            let mut slot = self.guard.borrow_mut();
            match checkpoint {
                Some(checkpoint) => {
                    if let Some(guard) = slot.as_mut() {
                        guard.rollback(checkpoint);
                    }
                }
                None => *slot = None,
            }
            self.depth.set(depth);
        }
        result
    }

    /// Push through the reflector registered as `type_name`.
    pub fn push(&self, type_name: &str, value: Value) -> Result<Dynamic> {
        let reflector = self.registry.get(type_name)?;
        let push = reflector
            .push_to
            .ok_or_else(|| ReflectError::UnsupportedDirection {
                type_name: type_name.to_string(),
                direction: Direction::Push,
            })?;
        push(self, value)
    }

    /// Pull through the reflector registered as `type_name`.
    pub fn pull(&self, type_name: &str, value: &Dynamic) -> Result<Value> {
        let reflector = self.registry.get(type_name)?;
        let pull = reflector
            .pull_from
            .ok_or_else(|| ReflectError::UnsupportedDirection {
                type_name: type_name.to_string(),
                direction: Direction::Pull,
            })?;
        pull(self, value)
    }
}

/// Guard held by a composite converter for the duration of its work.
pub struct GuardScope<'c> {
    slot: &'c RefCell<Option<CycleGuard>>,
    owner: bool,
}

impl GuardScope<'_> {
    /// Mark `identity`. Returns true if it was already visited.
    pub fn mark(&self, identity: usize) -> bool {
        self.slot
            .borrow_mut()
            .as_mut()
            .is_some_and(|guard| guard.mark(identity))
    }

    /// Mark `identity`, failing with `CyclicStructure` if it was already
    /// visited.
    pub fn visit(&self, identity: usize, type_name: &str) -> Result<()> {
        if self.mark(identity) {
            return Err(ReflectError::CyclicStructure(type_name.to_string()));
        }
        Ok(())
    }

    pub fn is_owner(&self) -> bool {
        self.owner
    }
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        if self.owner {
            *self.slot.borrow_mut() = None;
        }
    }
}

pub struct DepthScope<'c> {
    depth: &'c Cell<usize>,
}

impl Drop for DepthScope<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> (Registry, Formats) {
        (
            Registry::builder().build().unwrap(),
            Formats::builder().build().unwrap(),
        )
    }

    #[test]
    fn test_guard_is_reentrant() {
        let (registry, formats) = empty();
        let ctx = Context::new(&registry, &formats);
        assert!(!ctx.is_guarded());
        {
            let outer = ctx.guard();
            assert!(outer.is_owner());
            assert!(!outer.mark(1));
            {
                let inner = ctx.guard();
                assert!(!inner.is_owner());
                assert!(inner.mark(1));
            }
            assert!(ctx.is_guarded());
        }
        assert!(!ctx.is_guarded());
        assert!(!ctx.guard().mark(1));
    }

    #[test]
    fn test_descend_enforces_limit() {
        let (registry, formats) = empty();
        let ctx = Context::new(&registry, &formats).with_limits(Limits {
            max_depth: 2,
            ..Limits::default()
        });
        let a = ctx.descend().unwrap();
        let b = ctx.descend().unwrap();
        assert_eq!(ctx.descend().err(), Some(ReflectError::DepthExceeded(2)));
        drop(b);
        drop(a);
        assert!(ctx.descend().is_ok());
    }

    #[test]
    fn test_attempt_rolls_back_marks() {
        let (registry, formats) = empty();
        let ctx = Context::new(&registry, &formats);
        let scope = ctx.guard();
        let failed: Result<()> = ctx.attempt(|ctx| {
            ctx.guard().visit(7, "Array")?;
            Err(ReflectError::mismatch("Array", "table"))
        });
        assert!(failed.is_err());
        assert!(scope.visit(7, "Dictionary").is_ok());
    }

    #[test]
    fn test_attempt_keeps_marks_made_before_it() {
        let (registry, formats) = empty();
        let ctx = Context::new(&registry, &formats);
        let scope = ctx.guard();
        scope.visit(1, "Array").unwrap();
        for id in 2..1000 {
            let failed: Result<()> = ctx.attempt(|ctx| {
                ctx.guard().visit(id, "Array")?;
                Err(ReflectError::mismatch("Array", "table"))
            });
            assert!(failed.is_err());
            scope.visit(id, "Dictionary").unwrap();
        }
        assert!(scope.visit(1, "Array").is_err());
        assert!(scope.visit(999, "Array").is_err());
    }

    #[test]
    fn test_push_unknown_type() {
        let (registry, formats) = empty();
        let ctx = Context::new(&registry, &formats);
        assert_eq!(
            ctx.push("Vector3", Value::Nil).unwrap_err(),
            ReflectError::UnknownType("Vector3".into())
        );
    }
}
