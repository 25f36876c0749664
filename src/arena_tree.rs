//! An index-addressed tree of runs.
//!
//! Every node lives in an [`id_arena::Arena`]; links between nodes are
//! [`Id`]s held in `Cell`s, so structural edits (append, insert, detach)
//! only need a shared borrow of the arena. Parent links are plain indices
//! and never own anything.
//!
//! Adapted from <https://github.com/SimonSapin/rust-forest/blob/5783c8be8680b84c0438638bdee07d4e4aca40ac/arena-tree/lib.rs>.
//! MIT license (per Cargo.toml).

use std::cell::Cell;
use std::fmt;

/// A handle to a node in an [`Arena`].
#[derive(Hash, PartialOrd, Ord, Debug)]
pub struct Id<T>(pub id_arena::Id<Node<T>>);

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Id<T> {
        *self
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

/// A node: its payload plus the links that place it in the tree.
pub struct Node<T> {
    parent: Cell<Option<Id<T>>>,
    previous_sibling: Cell<Option<Id<T>>>,
    next_sibling: Cell<Option<Id<T>>>,
    first_child: Cell<Option<Id<T>>>,
    last_child: Cell<Option<Id<T>>>,

    /// The payload.
    pub data: T,
}

/// Owner of every node of a tree.
pub type Arena<T> = id_arena::Arena<Node<T>>;

impl<T> fmt::Debug for Node<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_struct("Node").field("data", &self.data).finish()
    }
}

impl<T> Node<T> {
    fn new(data: T) -> Node<T> {
        Node {
            parent: Cell::new(None),
            previous_sibling: Cell::new(None),
            next_sibling: Cell::new(None),
            first_child: Cell::new(None),
            last_child: Cell::new(None),
            data,
        }
    }

    fn unlink(&self, arena: &Arena<T>) {
        let parent = self.parent.take().map(|p| &arena[p.0]);
        let previous_sibling = self.previous_sibling.take();
        let next_sibling = self.next_sibling.take();

        match (next_sibling, parent) {
            (Some(next), _) => arena[next.0].previous_sibling.set(previous_sibling),
            (None, Some(parent)) => parent.last_child.set(previous_sibling),
            (None, None) => {}
        }

        match (previous_sibling, parent) {
            (Some(previous), _) => arena[previous.0].next_sibling.set(next_sibling),
            (None, Some(parent)) => parent.first_child.set(next_sibling),
            (None, None) => {}
        }
    }
}

impl<T> Id<T> {
    /// Allocate a detached node holding `data`.
    pub fn new_in(arena: &mut Arena<T>, data: T) -> Id<T> {
        Id(arena.alloc(Node::new(data)))
    }

    /// The node's payload.
    #[inline]
    pub fn data(self, arena: &Arena<T>) -> &T {
        &arena[self.0].data
    }

    /// The node's payload, mutably.
    #[inline]
    pub fn data_mut(self, arena: &mut Arena<T>) -> &mut T {
        &mut arena[self.0].data
    }

    pub fn parent(self, arena: &Arena<T>) -> Option<Id<T>> {
        arena[self.0].parent.get()
    }

    pub fn first_child(self, arena: &Arena<T>) -> Option<Id<T>> {
        arena[self.0].first_child.get()
    }

    pub fn last_child(self, arena: &Arena<T>) -> Option<Id<T>> {
        arena[self.0].last_child.get()
    }

    pub fn next_sibling(self, arena: &Arena<T>) -> Option<Id<T>> {
        arena[self.0].next_sibling.get()
    }

    /// This node, then its parent, and so on up to the root.
    pub fn ancestors(self, arena: &Arena<T>) -> Ancestors<'_, T> {
        Ancestors(Some((arena, self)))
    }

    pub fn children(self, arena: &Arena<T>) -> Children<'_, T> {
        Children(arena[self.0].first_child.get().map(|c| (arena, c)))
    }

    pub fn reverse_children(self, arena: &Arena<T>) -> ReverseChildren<'_, T> {
        ReverseChildren(arena[self.0].last_child.get().map(|c| (arena, c)))
    }

    /// This node and everything below it, parents before children.
    pub fn descendants(self, arena: &Arena<T>) -> Descendants<'_, T> {
        Descendants {
            arena,
            root: self,
            next: Some(self),
        }
    }

    /// Remove the node from its parent and siblings. Its own children stay put.
    #[inline]
    pub fn detach(self, arena: &Arena<T>) {
        arena[self.0].unlink(arena);
    }

    /// Move `new_child` to the end of this node's children.
    pub fn append(self, arena: &Arena<T>, new_child: Id<T>) {
        let node = &arena[self.0];
        let child = &arena[new_child.0];
        child.unlink(arena);

        child.parent.set(Some(self));
        match node.last_child.take() {
            Some(last) => {
                child.previous_sibling.set(Some(last));
                arena[last.0].next_sibling.set(Some(new_child));
            }
            None => node.first_child.set(Some(new_child)),
        }
        node.last_child.set(Some(new_child));
    }

    /// Move `new_child` to the front of this node's children.
    pub fn prepend(self, arena: &Arena<T>, new_child: Id<T>) {
        let node = &arena[self.0];
        let child = &arena[new_child.0];
        child.unlink(arena);

        child.parent.set(Some(self));
        match node.first_child.take() {
            Some(first) => {
                child.next_sibling.set(Some(first));
                arena[first.0].previous_sibling.set(Some(new_child));
            }
            None => node.last_child.set(Some(new_child)),
        }
        node.first_child.set(Some(new_child));
    }

    /// Move `new_sibling` directly before this node.
    pub fn insert_before(self, arena: &Arena<T>, new_sibling: Id<T>) {
        let node = &arena[self.0];
        let sibling = &arena[new_sibling.0];
        sibling.unlink(arena);

        sibling.parent.set(node.parent.get());
        sibling.next_sibling.set(Some(self));
        match node.previous_sibling.take() {
            Some(previous) => {
                sibling.previous_sibling.set(Some(previous));
                arena[previous.0].next_sibling.set(Some(new_sibling));
            }
            None => {
                if let Some(parent) = node.parent.get() {
                    arena[parent.0].first_child.set(Some(new_sibling));
                }
            }
        }
        node.previous_sibling.set(Some(new_sibling));
    }

    /// Move `new_sibling` directly after this node.
    pub fn insert_after(self, arena: &Arena<T>, new_sibling: Id<T>) {
        let node = &arena[self.0];
        let sibling = &arena[new_sibling.0];
        sibling.unlink(arena);

        sibling.parent.set(node.parent.get());
        sibling.previous_sibling.set(Some(self));
        match node.next_sibling.take() {
            Some(next) => {
                sibling.next_sibling.set(Some(next));
                arena[next.0].previous_sibling.set(Some(new_sibling));
            }
            None => {
                if let Some(parent) = node.parent.get() {
                    arena[parent.0].last_child.set(Some(new_sibling));
                }
            }
        }
        node.next_sibling.set(Some(new_sibling));
    }

    /// Replace this node by its children, in order.
    pub fn unwrap_children(self, arena: &Arena<T>) {
        while let Some(child) = self.first_child(arena) {
            self.insert_before(arena, child);
        }
        self.detach(arena);
    }
}

macro_rules! axis_iterator {
    (#[$attr:meta] $name:ident : $next:ident) => {
        #[$attr]
        #[derive(Debug)]
        pub struct $name<'a, T>(Option<(&'a Arena<T>, Id<T>)>);

        impl<'a, T> Iterator for $name<'a, T> {
            type Item = Id<T>;

            fn next(&mut self) -> Option<Id<T>> {
                let (arena, id) = self.0.take()?;
                self.0 = arena[id.0].$next.get().map(|n| (arena, n));
                Some(id)
            }
        }
    };
}

axis_iterator! {
    #[doc = "Iterates a node and its ancestors."]
    Ancestors: parent
}

axis_iterator! {
    #[doc = "Iterates the children of a node."]
    Children: next_sibling
}

axis_iterator! {
    #[doc = "Iterates the children of a node, last first."]
    ReverseChildren: previous_sibling
}

/// Pre-order walk over a subtree.
#[derive(Debug)]
pub struct Descendants<'a, T> {
    arena: &'a Arena<T>,
    root: Id<T>,
    next: Option<Id<T>>,
}

impl<'a, T> Iterator for Descendants<'a, T> {
    type Item = Id<T>;

    fn next(&mut self) -> Option<Id<T>> {
        let current = self.next.take()?;
        self.next = current.first_child(self.arena).or_else(|| {
            current
                .ancestors(self.arena)
                .take_while(|&a| a != self.root)
                .find_map(|a| a.next_sibling(self.arena))
        });
        Some(current)
    }
}
