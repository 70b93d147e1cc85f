use std::ffi::CStr;

use libjulia_sys::*;
use thiserror::Error;

/// Error type for Julia operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// `Runtime::init` was called while a runtime already exists (or existed)
    /// in this process.
    #[error("the Julia runtime can only be initialized once per process")]
    AlreadyInitialized,

    /// Runtime-level failure during initialization.
    #[error("failed to initialize Julia: {0}")]
    InitFailed(String),

    /// A Julia exception was raised while evaluating or calling managed code.
    #[error("Julia exception ({type_name}): {message}")]
    Exception { type_name: String, message: String },

    /// Type conversion error (e.g. tried to unbox a `Float64` from an `Int64`).
    #[error("type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    /// A function lookup found no binding with that name.
    #[error("no function `{name}` in module {module}")]
    UndefinedFunction { module: String, name: String },

    /// A string passed across the boundary contained an interior NUL byte.
    #[error("string contains an interior NUL byte: {0:?}")]
    InvalidString(String),

    /// A native function was rejected by the registry.
    #[error("cannot register native function `{name}`: {reason}")]
    NativeRegistration { name: String, reason: String },
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Check the current-error slot after `result` came back from the runtime.
///
/// The slot is left as is so that [`Runtime::exception`](crate::Runtime::exception)
/// and [`Runtime::report_exception`](crate::Runtime::report_exception) can
/// still observe it.
pub(crate) fn check_exception(result: *mut jl_value_t) -> Result<*mut jl_value_t> {
    let exc = unsafe { jl_exception_occurred() };
    if !exc.is_null() {
        let err = unsafe { exception_to_error(exc) };
        tracing::debug!(error = %err, "Julia exception raised");
        return Err(err);
    }
    if result.is_null() {
        return Err(Error::Exception {
            type_name: "Unknown".into(),
            message: "runtime returned no value and no exception".into(),
        });
    }
    Ok(result)
}

/// Render an exception object as a Rust error using `Base.showerror`.
///
/// # Safety
/// `exc` must be a live Julia object.
pub(crate) unsafe fn exception_to_error(exc: *mut jl_value_t) -> Error {
    unsafe {
        let type_name = cstr_lossy(jl_typeof_str(exc));
        let message = render_with(exc, c"showerror").unwrap_or_else(|| type_name.clone());
        Error::Exception { type_name, message }
    }
}

/// `sprint(f, v)` for a `Base` function `f`, without disturbing the
/// current-error slot. Returns `None` if rendering itself failed.
///
/// # Safety
/// `v` must be a live Julia object.
pub(crate) unsafe fn render_with(v: *mut jl_value_t, f: &CStr) -> Option<String> {
    unsafe {
        let pending = jl_exception_occurred();
        let sprint = jl_get_global(jl_base_module, jl_symbol(c"sprint".as_ptr()));
        let func = jl_get_global(jl_base_module, jl_symbol(f.as_ptr()));
        if sprint.is_null() || func.is_null() {
            return None;
        }

        // `pending` is the only reference to the original exception while
        // sprint runs, so keep it rooted.
        let mut frame: [*mut jl_value_t; 4] = [std::ptr::null_mut(); 4];
        frame[2] = v;
        frame[3] = if pending.is_null() { jl_nothing } else { pending };
        julia_rs_gc_push(frame.as_mut_ptr(), 2);

        let s = jl_call2(sprint, func, v);
        let failed = s.is_null() || !jl_exception_occurred().is_null();
        let text = if failed {
            None
        } else {
            Some(cstr_lossy(jl_string_ptr(s)))
        };

        julia_rs_gc_pop(frame.as_mut_ptr());

        // A successful call cleared the slot; put the original back.
        if !pending.is_null() && jl_exception_occurred() != pending {
            restore_exception(pending);
        }
        text
    }
}

/// Re-arm the current-error slot with `exc`.
///
/// The embedding API has no setter for the slot, so this rethrows through
/// an evaluation that only ever fails with the given exception object.
unsafe fn restore_exception(exc: *mut jl_value_t) {
    unsafe {
        let throw = jl_get_global(jl_core_module, jl_symbol(c"throw".as_ptr()));
        if !throw.is_null() {
            jl_call1(throw, exc);
        }
    }
}

pub(crate) unsafe fn cstr_lossy(p: *const std::ffi::c_char) -> String {
    if p.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
}
