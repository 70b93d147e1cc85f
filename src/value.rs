use std::marker::PhantomData;
use std::ptr::NonNull;

use libjulia_sys::*;

use crate::Runtime;
use crate::convert::{FromJulia, IntoJulia, JuliaScalar};
use crate::error::{Error, Result, check_exception, cstr_lossy};

/// A reference to a Julia object tied to the lifetime of a [`Runtime`].
///
/// A `Value` is **not** rooted: it stays valid until the next call that may
/// run the garbage collector. Wrap it in [`Rooted`](crate::Rooted) if it has
/// to survive such a call.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Value<'rt> {
    raw: NonNull<jl_value_t>,
    _marker: PhantomData<&'rt Runtime>,
}

impl<'rt> Value<'rt> {
    /// Box a Rust value.
    pub fn new<T: IntoJulia<'rt>>(rt: &'rt Runtime, value: T) -> Self {
        value.into_julia(rt)
    }

    /// The `nothing` singleton.
    pub fn nothing(rt: &'rt Runtime) -> Self {
        unsafe { Value::from_raw(rt, jl_nothing) }
    }

    /// Wrap a raw pointer produced by the runtime.
    ///
    /// # Safety
    /// `raw` must be a non-null pointer to a live Julia object.
    pub(crate) unsafe fn from_raw(_rt: &'rt Runtime, raw: *mut jl_value_t) -> Self {
        Value {
            raw: unsafe { NonNull::new_unchecked(raw) },
            _marker: PhantomData,
        }
    }

    /// Wrap the result of a runtime call, converting a pending exception or
    /// a null result into an error.
    pub(crate) fn checked(rt: &'rt Runtime, raw: *mut jl_value_t) -> Result<Self> {
        let raw = check_exception(raw)?;
        Ok(unsafe { Value::from_raw(rt, raw) })
    }

    /// The underlying `jl_value_t *`.
    pub fn as_raw(&self) -> *mut jl_value_t {
        self.raw.as_ptr()
    }

    // -- type checks -----------------------------------------------------------

    /// Name of the value's type without parameters, e.g. `"Float64"` or `"Array"`.
    pub fn type_name(&self) -> String {
        unsafe { cstr_lossy(jl_typeof_str(self.as_raw())) }
    }

    /// Whether this value's type is exactly `T`'s Julia type.
    pub fn is<T: JuliaScalar>(&self) -> bool {
        unsafe { julia_rs_typeof(self.as_raw()) == T::julia_type().cast() }
    }

    /// Whether this is the `nothing` singleton.
    pub fn is_nothing(&self) -> bool {
        self.as_raw() == unsafe { jl_nothing }
    }

    pub(crate) fn check_type<T: JuliaScalar>(&self) -> Result<()> {
        if self.is::<T>() {
            Ok(())
        } else {
            Err(Error::TypeError {
                expected: T::JULIA_NAME.into(),
                got: self.type_name(),
            })
        }
    }

    // -- extraction ------------------------------------------------------------

    /// Unbox into a Rust value, checking the Julia type first.
    pub fn unbox<T: FromJulia<'rt>>(&self) -> Result<T> {
        T::from_julia(self)
    }

    /// `Base.string(value)`.
    pub fn to_display_string(&self, rt: &'rt Runtime) -> Result<String> {
        let this = rt.root(*self);
        let string = rt.base().function("string")?;
        string.call1(this.get())?.unbox()
    }
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Value({}@{:?})", self.type_name(), self.raw)
    }
}
