use alloc::{alloc::handle_alloc_error, vec::Vec};
use core::{alloc::Layout, fmt, marker::PhantomData, mem, ptr::NonNull};

use fixed_pool::{AllocError, Global, MemoryResource};

use crate::iter::{IntoIter, Iter, IterMut};

/// Non-null pointer to a node, or `None` at the end of the chain.
pub(crate) type Link<T> = Option<NonNull<Node<T>>>;

pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) next: Link<T>,
}

impl<T> Node<T> {
    const LAYOUT: Layout = Layout::new::<Self>();
}

/// A singly-linked list whose nodes are allocated from a [`MemoryResource`].
///
/// Every inserted element costs exactly one allocation of a node from the
/// list's resource, and every removed element exactly one deallocation,
/// including the removals performed by [`clear`](Self::clear) and by `Drop`.
///
/// # Examples
///
/// ```
/// use fixed_pool::FixedPool;
/// use forward_list::ForwardList;
///
/// let pool = FixedPool::new(1024).unwrap();
/// let mut list = ForwardList::new_in(&pool);
///
/// list.push_front(3);
/// list.push_front(2);
/// list.push_front(1);
///
/// assert_eq!(list.len(), 3);
/// assert_eq!(list.front(), Some(&1));
/// assert!(list.iter().eq([1, 2, 3].iter()));
/// ```
pub struct ForwardList<T, R = Global>
where
    R: MemoryResource,
{
    head: Link<T>,
    len: usize,
    resource: R,
    marker: PhantomData<Node<T>>,
}

unsafe impl<T, R> Send for ForwardList<T, R>
where
    T: Send,
    R: MemoryResource + Send,
{
}

unsafe impl<T, R> Sync for ForwardList<T, R>
where
    T: Sync,
    R: MemoryResource + Sync,
{
}

impl<T> ForwardList<T> {
    /// Creates an empty list backed by the global allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<T> Default for ForwardList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> ForwardList<T, R>
where
    R: MemoryResource,
{
    /// Creates an empty list that allocates its nodes from `resource`.
    pub const fn new_in(resource: R) -> Self {
        Self {
            head: None,
            len: 0,
            resource,
            marker: PhantomData,
        }
    }

    /// Returns the resource the nodes are allocated from.
    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Returns the number of elements in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns a reference to the first element, or `None` if the list is
    /// empty.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.head.map(|node| unsafe { &(*node.as_ptr()).value })
    }

    /// Returns a mutable reference to the first element, or `None` if the list
    /// is empty.
    #[must_use]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.head.map(|node| unsafe { &mut (*node.as_ptr()).value })
    }

    /// Inserts `value` at the front of the list.
    ///
    /// If the resource cannot provide a node, the list is left unchanged and
    /// `value` is dropped.
    pub fn try_push_front(&mut self, value: T) -> Result<(), AllocError> {
        let node = self.resource.allocate(Node::<T>::LAYOUT)?.cast::<Node<T>>();
        unsafe {
            node.write(Node {
                value,
                next: self.head,
            });
        }
        self.head = Some(node);
        self.len += 1;
        Ok(())
    }

    /// Inserts `value` at the front of the list.
    ///
    /// # Panics
    ///
    /// Aborts through [`handle_alloc_error`] if the resource cannot provide a
    /// node.
    pub fn push_front(&mut self, value: T) {
        if let Err(err) = self.try_push_front(value) {
            log::error!("failed to allocate a list node: {err}");
            handle_alloc_error(Node::<T>::LAYOUT);
        }
    }

    /// Removes the first element and returns it, or `None` if the list is
    /// empty.
    pub fn pop_front(&mut self) -> Option<T> {
        let node = self.head?;
        let Node { value, next } = unsafe { node.read() };
        unsafe { self.resource.deallocate(node.cast(), Node::<T>::LAYOUT) };
        self.head = next;
        self.len -= 1;
        Some(value)
    }

    /// Removes all elements, returning every node to the resource.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Returns an iterator over the elements, front to back.
    ///
    /// Each call starts a fresh traversal from the head.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.head, self.len)
    }

    /// Returns an iterator over mutable references to the elements, front to
    /// back.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.head, self.len)
    }

    /// Moves all elements of `other` to the front of `self`, keeping their
    /// order. `other` is left empty.
    ///
    /// When both lists allocate from equal resources the nodes are relinked
    /// in place. Otherwise each element is moved into a node allocated from
    /// `self`'s resource, and `other`'s nodes are returned to its own resource.
    ///
    /// # Panics
    ///
    /// Aborts through [`handle_alloc_error`] if `self`'s resource runs out of
    /// memory while elements are being moved.
    pub fn splice_front(&mut self, other: &mut Self) {
        let Some(other_head) = other.head else {
            return;
        };

        if self.resource.is_equal(&other.resource) {
            let mut tail = other_head;
            unsafe {
                while let Some(next) = (*tail.as_ptr()).next {
                    tail = next;
                }
                (*tail.as_ptr()).next = self.head;
            }
            self.head = other.head.take();
            self.len += mem::take(&mut other.len);
            return;
        }

        log::trace!(
            "moving {} elements between unequal resources",
            other.len()
        );
        let mut values = Vec::with_capacity(other.len());
        while let Some(value) = other.pop_front() {
            values.push(value);
        }
        for value in values.into_iter().rev() {
            self.push_front(value);
        }
    }
}

impl<T, R> Drop for ForwardList<T, R>
where
    R: MemoryResource,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, R> Extend<T> for ForwardList<T, R>
where
    R: MemoryResource,
{
    /// Pushes every item to the front in turn, so they end up in reverse
    /// order.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_front(value);
        }
    }
}

impl<T> FromIterator<T> for ForwardList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T, R> fmt::Debug for ForwardList<T, R>
where
    T: fmt::Debug,
    R: MemoryResource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self).finish()
    }
}

impl<'a, T, R> IntoIterator for &'a ForwardList<T, R>
where
    R: MemoryResource,
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, R> IntoIterator for &'a mut ForwardList<T, R>
where
    R: MemoryResource,
{
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, R> IntoIterator for ForwardList<T, R>
where
    R: MemoryResource,
{
    type Item = T;
    type IntoIter = IntoIter<T, R>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}
