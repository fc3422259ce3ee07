//! Interception points spliced into host callbacks
//!
//! The host calls a named hook with some arguments; interception points get a
//! chance to pass the call through, rewrite the arguments or swallow it.
//! How the hook is installed is the host integration's business.

use std::cell::Cell;
use std::cmp::Reverse;
use std::rc::Rc;

use tracing::trace;

/// Decision of an interception point about one host call
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome<A> {
    /// Call the host with the arguments unchanged
    Pass(A),
    /// Call the host with different arguments
    Replace(A),
    /// Do not call the host
    Suppress,
}

impl<A> HookOutcome<A> {
    /// Arguments the host should be called with, if any
    pub fn into_args(self) -> Option<A> {
        match self {
            Self::Pass(args) | Self::Replace(args) => Some(args),
            Self::Suppress => None,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppress)
    }
}

/// Handler attached to a named host hook
///
/// Points are run in priority order (highest first).
pub trait InterceptionPoint<A> {
    /// Host hook this point is attached to
    fn hook(&self) -> &str;

    /// Priority within the hook (higher = earlier)
    fn priority(&self) -> u32 {
        0
    }

    /// Inspect a host call
    fn intercept(&mut self, args: A) -> HookOutcome<A>;
}

/// Interception points sharing a hook
pub struct HookChain<A> {
    hook: String,
    points: Vec<Box<dyn InterceptionPoint<A>>>,
}

impl<A> HookChain<A> {
    pub fn new(hook: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            points: Vec::new(),
        }
    }

    pub fn hook(&self) -> &str {
        &self.hook
    }

    /// Attach a point; points for other hooks are ignored
    pub fn add(&mut self, point: Box<dyn InterceptionPoint<A>>) -> bool {
        if point.hook() != self.hook {
            return false;
        }
        self.points.push(point);
        self.points.sort_by_key(|p| Reverse(p.priority()));
        true
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Run every point, stopping at the first suppression
    ///
    /// A replacement feeds the next point; the result is `Replace` if any
    /// point rewrote the arguments.
    pub fn run(&mut self, args: A) -> HookOutcome<A> {
        let mut args = args;
        let mut replaced = false;
        for point in &mut self.points {
            match point.intercept(args) {
                HookOutcome::Pass(a) => args = a,
                HookOutcome::Replace(a) => {
                    replaced = true;
                    args = a;
                }
                HookOutcome::Suppress => {
                    trace!(hook = %self.hook, "Host call suppressed");
                    return HookOutcome::Suppress;
                }
            }
        }
        if replaced {
            HookOutcome::Replace(args)
        } else {
            HookOutcome::Pass(args)
        }
    }
}

/// Shared "a gesture is in progress" flag
///
/// The registry writes it; guards and other collaborators read it.
#[derive(Debug, Clone, Default)]
pub struct GestureActivity(Rc<Cell<bool>>);

impl GestureActivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn set(&self, active: bool) {
        self.0.set(active);
    }
}

/// Swallows a host hook while a camera gesture is running
///
/// Typical use is the host's own drag or wheel handling, which would
/// otherwise fight the gesture for the camera.
pub struct GestureGuard {
    hook: String,
    priority: u32,
    activity: GestureActivity,
}

impl GestureGuard {
    pub fn new(hook: impl Into<String>, activity: GestureActivity) -> Self {
        Self {
            hook: hook.into(),
            priority: 100,
            activity,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

impl<A> InterceptionPoint<A> for GestureGuard {
    fn hook(&self) -> &str {
        &self.hook
    }

    fn priority(&self) -> u32 {
        self.priority
    }

    fn intercept(&mut self, args: A) -> HookOutcome<A> {
        if self.activity.is_active() {
            HookOutcome::Suppress
        } else {
            HookOutcome::Pass(args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scale {
        priority: u32,
        factor: i32,
        seen: Rc<Cell<u32>>,
    }

    impl InterceptionPoint<i32> for Scale {
        fn hook(&self) -> &str {
            "wheel"
        }

        fn priority(&self) -> u32 {
            self.priority
        }

        fn intercept(&mut self, args: i32) -> HookOutcome<i32> {
            self.seen.set(self.seen.get() + 1);
            if self.factor == 1 {
                HookOutcome::Pass(args)
            } else {
                HookOutcome::Replace(args * self.factor)
            }
        }
    }

    #[test]
    fn test_chain_passes_through_when_untouched() {
        let seen = Rc::new(Cell::new(0));
        let mut chain: HookChain<i32> = HookChain::new("wheel");
        chain.add(Box::new(Scale {
            priority: 0,
            factor: 1,
            seen: seen.clone(),
        }));

        assert_eq!(chain.run(5), HookOutcome::Pass(5));
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn test_replacements_feed_the_next_point() {
        let seen = Rc::new(Cell::new(0));
        let mut chain: HookChain<i32> = HookChain::new("wheel");
        for (priority, factor) in [(1, 3), (5, 2)] {
            chain.add(Box::new(Scale {
                priority,
                factor,
                seen: seen.clone(),
            }));
        }

        assert_eq!(chain.run(5), HookOutcome::Replace(30));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_points_for_other_hooks_are_rejected() {
        let mut chain: HookChain<i32> = HookChain::new("drag");
        let added = chain.add(Box::new(Scale {
            priority: 0,
            factor: 2,
            seen: Rc::new(Cell::new(0)),
        }));
        assert!(!added);
        assert!(chain.is_empty());
    }

    #[test]
    fn test_guard_suppresses_only_while_active() {
        let activity = GestureActivity::new();
        let seen = Rc::new(Cell::new(0));
        let mut chain: HookChain<i32> = HookChain::new("wheel");
        chain.add(Box::new(GestureGuard::new("wheel", activity.clone())));
        chain.add(Box::new(Scale {
            priority: 0,
            factor: 2,
            seen: seen.clone(),
        }));

        assert_eq!(chain.run(1), HookOutcome::Replace(2));

        activity.set(true);
        let outcome = chain.run(1);
        assert!(outcome.is_suppressed());
        assert_eq!(outcome.into_args(), None);
        // lower-priority point never saw the suppressed call
        assert_eq!(seen.get(), 1);
    }
}
