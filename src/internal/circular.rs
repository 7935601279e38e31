//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{LocatorError, LocatorResult};

const MAX_DEPTH: usize = 1024;

// Keys currently being constructed on this thread, outermost first
thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Marks a key as under construction until dropped.
pub(crate) struct StackGuard {
    name: String,
}

impl StackGuard {
    /// Pushes `name`, failing if it is already on the stack or the stack is too deep.
    pub(crate) fn enter(name: String) -> LocatorResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            if stack.iter().any(|n| *n == name) {
                let mut path = stack.clone();
                path.push(name);
                return Err(LocatorError::Circular(path));
            }

            if stack.len() >= MAX_DEPTH {
                return Err(LocatorError::DepthExceeded(stack.len()));
            }

            stack.push(name.clone());
            Ok(Self { name })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(last) = stack.pop() {
                debug_assert_eq!(last, self.name);
            }
        });
    }
}

/// Runs `f` with `name` pushed on the resolution stack.
pub(crate) fn with_circular_guard<T, F>(name: String, f: F) -> LocatorResult<T>
where
    F: FnOnce() -> LocatorResult<T>,
{
    let _guard = StackGuard::enter(name)?;
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_same_name_is_circular() {
        let result: LocatorResult<()> = with_circular_guard("A".into(), || {
            with_circular_guard("B".into(), || with_circular_guard("A".into(), || Ok(())))
        });

        assert_eq!(
            result.unwrap_err(),
            LocatorError::Circular(vec!["A".into(), "B".into(), "A".into()])
        );
    }

    #[test]
    fn deep_distinct_chain_hits_depth_limit() {
        fn descend(level: usize) -> LocatorResult<()> {
            with_circular_guard(format!("level-{}", level), || descend(level + 1))
        }

        assert_eq!(descend(0), Err(LocatorError::DepthExceeded(MAX_DEPTH)));
        assert!(with_circular_guard("level-0".to_string(), || Ok(())).is_ok());
    }

    #[test]
    fn stack_unwinds_after_failure() {
        let _ = with_circular_guard("A".to_string(), || with_circular_guard("A".to_string(), || Ok(())));
        assert!(with_circular_guard("A".to_string(), || Ok(())).is_ok());
    }
}
