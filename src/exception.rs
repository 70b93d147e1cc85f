use libjulia_sys::*;

use crate::Runtime;
use crate::error::{Error, Result, check_exception, exception_to_error, render_with};
use crate::value::Value;

/// The exception currently held in the runtime's error slot.
///
/// Obtained from [`Runtime::exception`].
#[derive(Clone, Copy)]
pub struct Exception<'rt> {
    value: Value<'rt>,
    rt: &'rt Runtime,
}

impl<'rt> Exception<'rt> {
    pub(crate) fn new(rt: &'rt Runtime, value: Value<'rt>) -> Self {
        Exception { value, rt }
    }

    /// The exception object.
    pub fn as_value(&self) -> Value<'rt> {
        self.value
    }

    /// Exception type name, e.g. `"UndefVarError"`.
    pub fn type_name(&self) -> String {
        self.value.type_name()
    }

    /// `sprint(showerror, exc)`.
    pub fn message(&self) -> String {
        unsafe { render_with(self.value.as_raw(), c"showerror") }.unwrap_or_else(|| self.type_name())
    }

    /// Convert into the Rust error returned by evaluation wrappers.
    pub fn to_error(&self) -> Error {
        unsafe { exception_to_error(self.value.as_raw()) }
    }

    /// `show(stderr, exc)` on the runtime's own stderr, followed by a
    /// newline written through the runtime stream API.
    ///
    /// On success the current-error slot is cleared. If `show` itself
    /// throws, that exception is returned and left in the slot.
    pub fn show(&self) -> Result<()> {
        let _root = self.rt.root(self.value);
        let show = self.rt.base().function("show")?;
        let raw = unsafe { jl_call2(show.as_value().as_raw(), jl_stderr_obj(), self.value.as_raw()) };
        check_exception(raw)?;
        unsafe { jl_printf(jl_stderr_stream(), c"\n".as_ptr()) };
        Ok(())
    }
}

impl std::fmt::Debug for Exception<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Exception({})", self.type_name())
    }
}
