//! Order-preserving map over independent items.
//!
//! With the `parallel` feature the work runs on the rayon pool. Output order
//! always equals input order, so tie-breaks that depend on input order give the
//! same result either way.

#[cfg(feature = "parallel")]
pub(crate) fn map_ordered<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_ordered<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(f).collect()
}
