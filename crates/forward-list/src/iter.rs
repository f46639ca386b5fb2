use core::{iter::FusedIterator, marker::PhantomData};

use fixed_pool::MemoryResource;

use crate::list::{ForwardList, Link};

/// An iterator over references to the elements of a [`ForwardList`].
///
/// Created by [`ForwardList::iter`].
pub struct Iter<'a, T> {
    next: Link<T>,
    remaining: usize,
    marker: PhantomData<&'a T>,
}

impl<T> Iter<'_, T> {
    pub(crate) fn new(head: Link<T>, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
            marker: PhantomData,
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            remaining: self.remaining,
            marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        let node = unsafe { &*node.as_ptr() };
        self.next = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// An iterator over mutable references to the elements of a [`ForwardList`].
///
/// Created by [`ForwardList::iter_mut`].
pub struct IterMut<'a, T> {
    next: Link<T>,
    remaining: usize,
    marker: PhantomData<&'a mut T>,
}

impl<T> IterMut<'_, T> {
    pub(crate) fn new(head: Link<T>, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
            marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        let node = unsafe { &mut *node.as_ptr() };
        self.next = node.next;
        self.remaining -= 1;
        Some(&mut node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

/// An owning iterator over the elements of a [`ForwardList`].
///
/// Each yielded element releases its node back to the list's resource.
/// Elements left when the iterator is dropped are released as well.
pub struct IntoIter<T, R>
where
    R: MemoryResource,
{
    list: ForwardList<T, R>,
}

impl<T, R> IntoIter<T, R>
where
    R: MemoryResource,
{
    pub(crate) fn new(list: ForwardList<T, R>) -> Self {
        Self { list }
    }
}

impl<T, R> Iterator for IntoIter<T, R>
where
    R: MemoryResource,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T, R> ExactSizeIterator for IntoIter<T, R> where R: MemoryResource {}
impl<T, R> FusedIterator for IntoIter<T, R> where R: MemoryResource {}
