use std::marker::PhantomData;
use std::ptr::NonNull;

use libjulia_sys::*;

use crate::Runtime;
use crate::convert::JuliaScalar;
use crate::error::{Error, Result};
use crate::root::Rooted;
use crate::value::Value;

/// A one-dimensional Julia array (`Vector{T}`) with a bits element type.
///
/// The element storage is only reachable as a slice through a
/// [`Rooted`] array: an unrooted array may be collected by any call into
/// the runtime, taking its storage with it.
pub struct Array<'rt, T: JuliaScalar> {
    raw: NonNull<jl_array_t>,
    rt: &'rt Runtime,
    _elem: PhantomData<T>,
}

impl<'rt, T: JuliaScalar> Clone for Array<'rt, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'rt, T: JuliaScalar> Copy for Array<'rt, T> {}

fn vector_type<T: JuliaScalar>() -> *mut jl_value_t {
    unsafe { jl_apply_array_type(T::julia_type().cast(), 1) }
}

impl<'rt, T: JuliaScalar> Array<'rt, T> {
    /// Allocate a new zero-filled `Vector{T}` of `len` elements with
    /// `Base.zeros`.
    ///
    /// An impossible length or a failed allocation comes back as
    /// [`Error::Exception`] with the error slot set, like any other failed
    /// call.
    pub fn new(rt: &'rt Runtime, len: usize) -> Result<Self> {
        let n = i64::try_from(len).map_err(|_| Error::Exception {
            type_name: "ArgumentError".into(),
            message: format!("invalid Array size {len}"),
        })?;
        let zeros = rt.base().function("zeros")?;
        let elem = unsafe { Value::from_raw(rt, T::julia_type().cast()) };
        // `elem` is a permanently rooted type object; only `n` is allocated.
        let raw = rt.root(unsafe { zeros.call2(elem, Value::new(rt, n))? });
        let array = Self::from_value(rt, raw.get())?;
        tracing::debug!(elem = T::JULIA_NAME, len, "allocated array");
        Ok(array)
    }

    /// View a value as a `Vector{T}`, checking its type exactly.
    pub fn from_value(rt: &'rt Runtime, value: Value<'rt>) -> Result<Self> {
        if unsafe { julia_rs_typeof(value.as_raw()) } != vector_type::<T>() {
            return Err(Error::TypeError {
                expected: format!("Vector{{{}}}", T::JULIA_NAME),
                got: value.type_name(),
            });
        }
        Ok(Array {
            raw: unsafe { NonNull::new_unchecked(value.as_raw().cast()) },
            rt,
            _elem: PhantomData,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        unsafe { julia_rs_array_len(self.raw.as_ptr()) }
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw pointer to the first element.
    ///
    /// Valid while the array is alive; across calls that may collect, only
    /// while it is rooted.
    pub fn data_ptr(&self) -> *mut T {
        unsafe { julia_rs_array_data(self.raw.as_ptr()).cast() }
    }

    /// The array as a plain value, e.g. to pass it to a function.
    pub fn as_value(&self) -> Value<'rt> {
        unsafe { Value::from_raw(self.rt, self.raw.as_ptr().cast()) }
    }
}

impl<'rt, T: JuliaScalar> Rooted<'rt, Array<'rt, T>> {
    /// The elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        let len = self.len();
        let ptr = self.data_ptr();
        if ptr.is_null() || len == 0 {
            &[]
        } else {
            unsafe { std::slice::from_raw_parts(ptr, len) }
        }
    }

    /// The elements as a mutable slice. The borrow keeps the array from
    /// being handed to Julia while the slice is alive.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.len();
        let ptr = self.data_ptr();
        if ptr.is_null() || len == 0 {
            &mut []
        } else {
            unsafe { std::slice::from_raw_parts_mut(ptr, len) }
        }
    }

    /// Copy the elements out.
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<'rt, T: JuliaScalar> std::fmt::Debug for Array<'rt, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Array{{{}}}(len={})", T::JULIA_NAME, self.len())
    }
}
