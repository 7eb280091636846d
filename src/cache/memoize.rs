//! Memoize Module
//!
//! Function adapter pairing a computation with its own [`MemoCache`].

use std::fmt::Debug;

use crate::cache::{CacheArgs, CacheKey, CacheStats, MemoCache};
use crate::error::InvalidKeyError;

// == Memoized ==
/// A named function whose results are cached by call arguments.
///
/// ```
/// use bucket_audit::cache::{Memoized, MemoCache};
/// use bucket_audit::error::InvalidKeyError;
///
/// let square = Memoized::new("square", MemoCache::new(Some(16), None), |(n,): &(u64,)| {
///     Ok::<_, InvalidKeyError>(n * n)
/// });
/// assert_eq!(square.call((12,)).unwrap(), 144);
/// assert_eq!(square.stats().misses, 1);
/// ```
pub struct Memoized<F, V> {
    name: &'static str,
    cache: MemoCache<CacheKey, V>,
    func: F,
}

impl<F, V> Memoized<F, V>
where
    V: Clone + Debug,
{
    pub fn new(name: &'static str, cache: MemoCache<CacheKey, V>, func: F) -> Self {
        Self { name, cache, func }
    }

    // == Call ==
    /// Derives the key for `args`, then returns the cached result or calls the
    /// wrapped function.
    ///
    /// Key derivation failures surface through the function's own error type.
    /// The wrapped function may call other memoized functions sharing this
    /// cache, but not itself with the same arguments.
    pub fn call<A, E>(&self, args: A) -> Result<V, E>
    where
        A: CacheArgs,
        F: Fn(&A) -> Result<V, E>,
        E: From<InvalidKeyError>,
    {
        let key = args.cache_key()?;
        self.cache.get_or_compute(key, || (self.func)(&args))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CallArgs;
    use std::cell::Cell;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Key(InvalidKeyError),
        Failed,
    }

    impl From<InvalidKeyError> for TestError {
        fn from(e: InvalidKeyError) -> Self {
            TestError::Key(e)
        }
    }

    #[test]
    fn test_named_arguments_order_shares_entry() {
        let calls = Cell::new(0);
        let add = Memoized::new("add", MemoCache::new(None, None), |_: &CallArgs| {
            calls.set(calls.get() + 1);
            Ok::<_, TestError>(calls.get())
        });

        let first = add.call(CallArgs::new().arg("x").named("a", 1).named("b", 2));
        let second = add.call(CallArgs::new().arg("x").named("b", 2).named("a", 1));

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(add.len(), 1);
    }

    #[test]
    fn test_distinct_named_values_are_distinct_entries() {
        let f = Memoized::new("f", MemoCache::new(None, None), |_: &CallArgs| {
            Ok::<_, TestError>(())
        });

        f.call(CallArgs::new().arg(1).arg(2).named("a", 1)).unwrap();
        f.call(CallArgs::new().arg(1).arg(2).named("a", 2)).unwrap();

        assert_eq!(f.len(), 2);
        assert_eq!(f.stats().hits, 0);
    }

    #[test]
    fn test_invalid_key_is_surfaced_without_calling() {
        let calls = Cell::new(0);
        let f = Memoized::new("f", MemoCache::new(None, None), |_: &(f64,)| {
            calls.set(calls.get() + 1);
            Ok::<u32, TestError>(0)
        });

        let result = f.call((f64::NAN,));

        assert!(matches!(result, Err(TestError::Key(_))));
        assert_eq!(calls.get(), 0);
        assert!(f.is_empty());
    }

    #[test]
    fn test_failure_propagates_and_is_retried() {
        let attempts = Cell::new(0);
        let flaky = Memoized::new("flaky", MemoCache::new(None, None), |(n,): &(u32,)| {
            attempts.set(attempts.get() + 1);
            if attempts.get() == 1 {
                Err(TestError::Failed)
            } else {
                Ok(n + 1)
            }
        });

        assert_eq!(flaky.call((1,)), Err(TestError::Failed));
        assert_eq!(flaky.call((1,)), Ok(2));
        assert_eq!(flaky.call((1,)), Ok(2));
        assert_eq!(attempts.get(), 2);
        assert_eq!(flaky.name(), "flaky");
    }
}
