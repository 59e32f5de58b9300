//! The type-erased base of every stored value.

use std::any::Any;

/// Base interface of every value stored in a class-keyed database.
///
/// Tables store their concrete type contiguously and hand out `&dyn Object` when accessed
/// through the type-erased interface. Callers recover the concrete type with
/// [`downcast_ref`](dyn Object::downcast_ref) or [`downcast_mut`](dyn Object::downcast_mut).
///
/// Implemented for every `'static` type. Wrappers such as `Box<dyn Object>` are `'static` too,
/// so the trait methods carry their own names and the public accessors live on `dyn Object`,
/// which always dispatches to the stored value.
pub trait Object: Any + 'static {
    fn as_object_any(&self) -> &dyn Any;

    fn as_object_any_mut(&mut self) -> &mut dyn Any;

    fn object_type_name(&self) -> &'static str;
}

impl<T: Any> Object for T {
    #[inline]
    fn as_object_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_object_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn object_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl dyn Object {
    /// View as [`Any`] for downcasting.
    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        self.as_object_any()
    }

    /// View as mutable [`Any`] for downcasting.
    #[inline]
    pub fn as_any_mut(&mut self) -> &mut dyn Any {
        self.as_object_any_mut()
    }

    /// Rust type name of the concrete value.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.object_type_name()
    }

    /// Downcast to the concrete type, if it matches.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to the mutable concrete type, if it matches.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Check whether the concrete type is `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
