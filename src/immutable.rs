//! Persistent, structurally-shared state.
//!
//! Every piece of application state lives behind an [`Immutable`] handle. Writes
//! never touch the shared value: they shallow-clone the root, replace exactly one
//! field and hand back a new handle. Fields that are themselves `Immutable` are
//! cloned by reference, so any subtree an operation does not touch stays
//! pointer-equal to its previous version and change detection is a pointer compare.
//!
//! Fields are addressed through [`Lens`] values. A lens into a field holding a
//! nested `Immutable<C>` can be extended with [`Lens::then`], which is how a
//! parent reaches into the state of a child component.
//!
//! # Examples
//!
//! ```
//! use portal_runtime::immutable::{Immutable, Lens};
//!
//! #[derive(Clone)]
//! struct Counter {
//!     value: i32,
//! }
//!
//! #[derive(Clone)]
//! struct Model {
//!     left: Immutable<Counter>,
//!     right: Immutable<Counter>,
//! }
//!
//! let left = Lens::field(|m: &Model| &m.left, |m| &mut m.left);
//! let value = Lens::field(|c: &Counter| &c.value, |c| &mut c.value);
//! let left_value = left.then(value);
//!
//! let model = Immutable::new(Model {
//!     left: Immutable::new(Counter { value: 1 }),
//!     right: Immutable::new(Counter { value: 2 }),
//! });
//! let next = model.set_in(&left_value, 10);
//!
//! assert_eq!(next.get_in(&left_value), Some(&10));
//! assert_eq!(model.get_in(&left_value), Some(&1));
//! assert!(next.right.ptr_eq(&model.right));
//! ```

use std::{fmt, ops::Deref, sync::Arc};

/// A shared, never-mutated value.
///
/// Cloning an `Immutable` clones the reference, not the value.
pub struct Immutable<T>(Arc<T>);

impl<T> Immutable<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Immutable<T> {
    /// Reads the value at `key`, if present.
    pub fn get<'a, A>(&'a self, key: &Lens<T, A>) -> Option<&'a A> {
        (key.get)(self.0.as_ref())
    }

    /// Returns a new container with `value` stored at `key`.
    ///
    /// When the key cannot be written (an absent intermediate child), the
    /// returned container is the receiver itself.
    pub fn set<A>(&self, key: &Lens<T, A>, value: A) -> Self {
        let mut next = T::clone(&self.0);
        if (key.set)(&mut next, value) {
            Self::new(next)
        } else {
            self.clone()
        }
    }

    /// Replaces the value at `key` with `f` applied to it.
    ///
    /// Absent keys leave the container untouched.
    pub fn update<A>(&self, key: &Lens<T, A>, f: impl FnOnce(&A) -> A) -> Self {
        match self.get(key) {
            Some(current) => {
                let value = f(current);
                self.set(key, value)
            }
            None => self.clone(),
        }
    }

    /// Clears an optional slot.
    pub fn remove<A>(&self, key: &Lens<T, A>) -> Self {
        let mut next = T::clone(&self.0);
        if (key.clear)(&mut next) {
            Self::new(next)
        } else {
            self.clone()
        }
    }

    /// Reads through a path crossing nested `Immutable` boundaries.
    pub fn get_in<'a, A>(&'a self, path: &Lens<T, A>) -> Option<&'a A> {
        self.get(path)
    }

    /// Writes through a path crossing nested `Immutable` boundaries.
    ///
    /// Only the containers along the path are copied.
    pub fn set_in<A>(&self, path: &Lens<T, A>, value: A) -> Self {
        self.set(path, value)
    }

    /// Shallow copy-on-write of the root value.
    pub fn modify(&self, f: impl FnOnce(&mut T)) -> Self {
        let mut next = T::clone(&self.0);
        f(&mut next);
        Self::new(next)
    }
}

impl<T> Clone for Immutable<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for Immutable<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> AsRef<T> for Immutable<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T: PartialEq> PartialEq for Immutable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Immutable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<T: Default> Default for Immutable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Immutable<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

type Getter<S, A> = Arc<dyn for<'a> Fn(&'a S) -> Option<&'a A> + Send + Sync>;
type Setter<S, A> = Arc<dyn Fn(&mut S, A) -> bool + Send + Sync>;
type Clearer<S> = Arc<dyn Fn(&mut S) -> bool + Send + Sync>;

fn getter<S, A, F>(f: F) -> Getter<S, A>
where
    F: for<'a> Fn(&'a S) -> Option<&'a A> + Send + Sync + 'static,
{
    Arc::new(f)
}

fn setter<S, A, F>(f: F) -> Setter<S, A>
where
    F: Fn(&mut S, A) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

fn clearer<S, F>(f: F) -> Clearer<S>
where
    F: Fn(&mut S) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A typed key (or path) from a value `S` to a part `A` of it.
///
/// Lenses are cheap to clone and thread-safe, so they can be built once and
/// stored next to the component they address.
pub struct Lens<S, A> {
    get: Getter<S, A>,
    set: Setter<S, A>,
    clear: Clearer<S>,
}

impl<S: 'static, A: 'static> Lens<S, A> {
    /// A lens from raw accessors. `set` returns `false` when the target is absent.
    pub fn new(
        get: impl for<'a> Fn(&'a S) -> Option<&'a A> + Send + Sync + 'static,
        set: impl Fn(&mut S, A) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: getter(get),
            set: setter(set),
            clear: clearer(|_: &mut S| false),
        }
    }

    /// A lens onto a plain field that is always present.
    pub fn field(
        get: impl for<'a> Fn(&'a S) -> &'a A + Send + Sync + 'static,
        get_mut: impl for<'a> Fn(&'a mut S) -> &'a mut A + Send + Sync + 'static,
    ) -> Self {
        Self {
            get: getter(move |s: &S| Some(get(s))),
            set: setter(move |s: &mut S, value: A| {
                *get_mut(s) = value;
                true
            }),
            clear: clearer(|_: &mut S| false),
        }
    }

    /// A lens onto an `Option<A>` field.
    ///
    /// Writing fills the slot, [`Immutable::remove`] empties it.
    pub fn slot<G, M>(get: G, get_mut: M) -> Self
    where
        G: for<'a> Fn(&'a S) -> &'a Option<A> + Send + Sync + 'static,
        M: for<'a> Fn(&'a mut S) -> &'a mut Option<A> + Send + Sync + 'static,
    {
        let get_mut = Arc::new(get_mut);
        let clear_mut = Arc::clone(&get_mut);
        Self {
            get: getter(move |s: &S| get(s).as_ref()),
            set: setter(move |s: &mut S, value: A| {
                *get_mut(s) = Some(value);
                true
            }),
            clear: clearer(move |s: &mut S| clear_mut(s).take().is_some()),
        }
    }
}

impl<S: 'static, C: Clone + Send + Sync + 'static> Lens<S, Immutable<C>> {
    /// Extends this lens across the nested container it points at.
    ///
    /// Writing through the composed lens copies the outer value and the nested
    /// container, and nothing else. If the nested container is absent, the
    /// write is refused.
    pub fn then<B: 'static>(&self, inner: Lens<C, B>) -> Lens<S, B> {
        let outer_get = Arc::clone(&self.get);
        let inner_get = Arc::clone(&inner.get);
        let get = getter(move |s: &S| outer_get(s).and_then(|child| inner_get(&**child)));

        let outer_get = Arc::clone(&self.get);
        let outer_set = Arc::clone(&self.set);
        let inner_set = Arc::clone(&inner.set);
        let set = setter(move |s: &mut S, value: B| {
            let Some(child) = outer_get(&*s) else {
                return false;
            };
            let mut child = C::clone(child);
            if !inner_set(&mut child, value) {
                return false;
            }
            outer_set(s, Immutable::new(child))
        });

        let outer_get = Arc::clone(&self.get);
        let outer_set = Arc::clone(&self.set);
        let inner_clear = Arc::clone(&inner.clear);
        let clear = clearer(move |s: &mut S| {
            let Some(child) = outer_get(&*s) else {
                return false;
            };
            let mut child = C::clone(child);
            if !inner_clear(&mut child) {
                return false;
            }
            outer_set(s, Immutable::new(child))
        });

        Lens { get, set, clear }
    }
}

impl<S, A> Clone for Lens<S, A> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
            clear: Arc::clone(&self.clear),
        }
    }
}

impl<S, A> fmt::Debug for Lens<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens").finish_non_exhaustive()
    }
}
