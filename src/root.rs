use std::marker::PhantomData;
use std::ops::Deref;

use libjulia_sys::*;

use crate::Runtime;
use crate::array::Array;
use crate::convert::JuliaScalar;
use crate::function::Function;
use crate::module::Module;
use crate::value::Value;

/// A handle that refers to a single Julia object and can be rooted.
pub trait Managed<'rt>: Copy {
    fn as_value(&self) -> Value<'rt>;
}

impl<'rt> Managed<'rt> for Value<'rt> {
    fn as_value(&self) -> Value<'rt> {
        *self
    }
}

impl<'rt> Managed<'rt> for Function<'rt> {
    fn as_value(&self) -> Value<'rt> {
        Function::as_value(self)
    }
}

impl<'rt> Managed<'rt> for Module<'rt> {
    fn as_value(&self) -> Value<'rt> {
        Module::as_value(self)
    }
}

impl<'rt, T: JuliaScalar> Managed<'rt> for Array<'rt, T> {
    fn as_value(&self) -> Value<'rt> {
        Array::as_value(self)
    }
}

/// RAII registration of one object in the collector's root set.
///
/// Creating a `Rooted` pushes a one-slot GC frame onto the current task's
/// frame stack; dropping it pops that frame. Guards must be dropped in the
/// reverse order of creation, which Rust's scoping gives for free as long as
/// no guard is leaked.
///
/// ```rust,no_run
/// use rusty_julia::{Array, Runtime};
///
/// let rt = Runtime::init().unwrap();
/// let x = rt.root(Array::<f64>::new(&rt, 10).unwrap());
/// // `x` survives collections triggered by calls made here.
/// drop(x);
/// ```
pub struct Rooted<'rt, T: Managed<'rt>> {
    // Boxed so the frame keeps its address when the guard moves.
    frame: Box<[*mut jl_value_t; 3]>,
    inner: T,
    _marker: PhantomData<(&'rt Runtime, *mut ())>,
}

impl<'rt, T: Managed<'rt>> Rooted<'rt, T> {
    pub(crate) fn new(_rt: &'rt Runtime, inner: T) -> Self {
        let mut frame = Box::new([std::ptr::null_mut(); 3]);
        frame[2] = inner.as_value().as_raw();
        unsafe { julia_rs_gc_push(frame.as_mut_ptr(), 1) };
        tracing::trace!(root = ?frame[2], "pushed GC root");
        Rooted {
            frame,
            inner,
            _marker: PhantomData,
        }
    }

    /// The rooted handle.
    pub fn get(&self) -> T {
        self.inner
    }
}

impl<'rt, T: Managed<'rt>> Deref for Rooted<'rt, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<'rt, T: Managed<'rt>> Drop for Rooted<'rt, T> {
    fn drop(&mut self) {
        let popped = unsafe { julia_rs_gc_pop(self.frame.as_mut_ptr()) };
        if popped == 0 {
            // An inner guard was leaked: its frame is still on the stack and
            // points at memory that is about to be freed.
            tracing::error!(root = ?self.frame[2], "GC roots released out of order");
            std::process::abort();
        }
        tracing::trace!(root = ?self.frame[2], "popped GC root");
    }
}

impl<'rt, T: Managed<'rt> + std::fmt::Debug> std::fmt::Debug for Rooted<'rt, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rooted({:?})", self.inner)
    }
}
