use core::cmp::Ordering;

/// A total order over `T`, fixed for the lifetime of a tree.
///
/// Every `Fn(&T, &T) -> Ordering` closure is a comparator, so a reversed tree
/// can be built with `AvlTree::with_comparator(|a: &u32, b: &u32| b.cmp(a))`.
pub trait Compare<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Orders items by their [`Ord`] implementation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord + ?Sized> Compare<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}
