//! High-level, safe Rust bindings for embedding the Julia runtime.
//!
//! Built on top of [`libjulia_sys`] (flat C FFI), this crate provides Rust
//! types whose `'rt` lifetime ties every handle to the [`Runtime`] it came
//! from. Julia can be initialized once per process and is bound to the
//! initializing thread, so `Runtime` is neither `Send` nor `Sync` and a
//! second [`Runtime::init`] fails.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use rusty_julia::{Array, Runtime, Value};
//!
//! let rt = Runtime::init().unwrap();
//!
//! // Evaluate Julia
//! let val = rt.eval("sqrt(2.0)").unwrap();
//! assert_eq!(val.unbox::<f64>().unwrap(), std::f64::consts::SQRT_2);
//!
//! // Call a function through a handle
//! let sqrt = rt.base().function("sqrt").unwrap();
//! let ret = sqrt.call1(Value::new(&rt, 2.0)).unwrap();
//! assert_eq!(ret.unbox::<f64>().unwrap(), std::f64::consts::SQRT_2);
//!
//! // Share an array with Julia, rooted while in use
//! let mut x = rt.root(Array::<f64>::new(&rt, 3).unwrap());
//! x.as_mut_slice().copy_from_slice(&[1.0, 2.0, 3.0]);
//! rt.base().function("reverse!").unwrap().call1(x.as_value()).unwrap();
//! assert_eq!(x.as_slice(), &[3.0, 2.0, 1.0]);
//! drop(x);
//!
//! let code = rt.shutdown(0);
//! assert_eq!(code, 0);
//! ```

mod array;
mod convert;
mod error;
mod exception;
mod function;
pub mod logger;
mod module;
mod native;
mod options;
mod root;
mod value;

pub use array::Array;
pub use convert::{FromJulia, IntoJulia, JuliaScalar};
pub use error::{Error, Result};
pub use exception::Exception;
pub use function::Function;
pub use module::Module;
pub use native::{
    MAX_NATIVE_ARITY, NativeFunction, NativeKind, NativeRegistry, NativeType,
    is_valid_identifier,
};
pub use options::{BINDIR_ENV, InitOptions, SYSIMAGE_ENV};
pub use root::{Managed, Rooted};
pub use rusty_julia_macros::julia_fn;
pub use value::Value;

use std::cell::RefCell;
use std::ffi::CString;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use libjulia_sys::*;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// The embedded Julia runtime.
///
/// Owns the process-wide runtime instance. All handles produced by it borrow
/// it via the `'rt` lifetime, ensuring they cannot outlive it.
///
/// **Not `Send` or `Sync`**: Julia is bound to the thread that initialized it.
pub struct Runtime {
    natives: RefCell<NativeRegistry>,
    exited: bool,
    _not_send_sync: PhantomData<*mut ()>,
}

impl Runtime {
    /// Initialize Julia with default options.
    pub fn init() -> Result<Self> {
        Self::init_with(InitOptions::new())
    }

    /// Initialize Julia. Fails with [`Error::AlreadyInitialized`] if a
    /// runtime has already been created in this process, even if it has
    /// since been shut down.
    pub fn init_with(options: InitOptions) -> Result<Self> {
        let args = options.to_c_args()?;
        if INITIALIZED.swap(true, Ordering::SeqCst) || unsafe { jl_is_initialized() } != 0 {
            return Err(Error::AlreadyInitialized);
        }

        match &args {
            None => unsafe { julia_rs_init() },
            Some((bindir, image)) => unsafe {
                let image = image.as_ref().map_or(std::ptr::null(), |i| i.as_ptr());
                julia_rs_init_with_image(bindir.as_ptr(), image)
            },
        }
        if unsafe { jl_is_initialized() } == 0 {
            return Err(Error::InitFailed("jl_init returned without initializing".into()));
        }

        tracing::info!(
            bindir = ?options.bindir_path(),
            image = ?options.image_path(),
            "Julia runtime initialized"
        );
        Ok(Runtime {
            natives: RefCell::new(NativeRegistry::new()),
            exited: false,
            _not_send_sync: PhantomData,
        })
    }

    /// Evaluate Julia source in `Main`.
    pub fn eval(&self, code: &str) -> Result<Value<'_>> {
        let c_code = CString::new(code).map_err(|_| Error::InvalidString(code.into()))?;
        tracing::debug!(code, "eval");
        let raw = unsafe { jl_eval_string(c_code.as_ptr()) };
        Value::checked(self, raw)
    }

    /// Box a Rust value.
    pub fn box_value<'rt, T: IntoJulia<'rt>>(&'rt self, value: T) -> Value<'rt> {
        value.into_julia(self)
    }

    /// The `Main` module, where [`eval`](Self::eval) defines things.
    pub fn main_module(&self) -> Module<'_> {
        unsafe { Module::from_raw(self, jl_main_module) }
    }

    /// The `Base` module.
    pub fn base(&self) -> Module<'_> {
        unsafe { Module::from_raw(self, jl_base_module) }
    }

    /// The `Core` module.
    pub fn core(&self) -> Module<'_> {
        unsafe { Module::from_raw(self, jl_core_module) }
    }

    /// Register `value` in the collector's root set until the returned
    /// guard drops.
    pub fn root<'rt, T: Managed<'rt>>(&'rt self, value: T) -> Rooted<'rt, T> {
        Rooted::new(self, value)
    }

    // -- current-error slot ----------------------------------------------------

    /// The exception left by the last failed evaluation or call, if any.
    pub fn exception(&self) -> Option<Exception<'_>> {
        let raw = unsafe { jl_exception_occurred() };
        if raw.is_null() {
            return None;
        }
        Some(Exception::new(self, unsafe { Value::from_raw(self, raw) }))
    }

    /// Empty the error slot without reporting anything.
    pub fn clear_exception(&self) {
        unsafe { jl_exception_clear() }
    }

    /// If the error slot holds an exception, show it on the runtime's stderr
    /// and clear the slot. Returns whether anything was reported.
    ///
    /// If displaying the exception throws in turn, both are logged at error
    /// level and the slot is still cleared.
    pub fn report_exception(&self) -> bool {
        let Some(exc) = self.exception() else {
            return false;
        };
        let type_name = exc.type_name();
        tracing::debug!(exception = %type_name, "reporting exception");
        if let Err(err) = exc.show() {
            tracing::error!(exception = %type_name, error = %err, "failed to show exception");
        }
        self.clear_exception();
        true
    }

    // -- native functions ------------------------------------------------------

    /// Validate `f` against the registry and define its typed wrapper in
    /// `Main`. Nothing is defined if validation fails.
    pub fn register_native(&self, f: &NativeFunction) -> Result<()> {
        self.natives.borrow().validate(f)?;
        self.eval(&f.wrapper_source())?;
        self.natives.borrow_mut().insert(*f)?;
        tracing::debug!(
            name = f.name(),
            symbol = f.symbol(),
            nargs = f.args().len(),
            "registered native function"
        );
        Ok(())
    }

    /// Snapshot of the registered native functions, ordered by name.
    pub fn natives(&self) -> Vec<NativeFunction> {
        self.natives.borrow().iter().copied().collect()
    }

    // -- streams and lifecycle -------------------------------------------------

    /// Flush the runtime's own `stdout` and `stderr`, which are separate
    /// from the process-level streams Rust writes to.
    pub fn flush_streams(&self) -> Result<()> {
        let flush = self.base().function("flush")?;
        unsafe {
            flush.call1(Value::from_raw(self, jl_stdout_obj()))?;
            flush.call1(Value::from_raw(self, jl_stderr_obj()))?;
        }
        Ok(())
    }

    /// Run Julia's exit hooks with `code` and return `code` for the caller to
    /// pass to [`std::process::exit`]. The runtime cannot be used again.
    pub fn shutdown(mut self, code: i32) -> i32 {
        self.exited = true;
        tracing::info!(code, "shutting down Julia runtime");
        unsafe { jl_atexit_hook(code) };
        code
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if !self.exited {
            unsafe { jl_atexit_hook(0) }
        }
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("natives", &self.natives.borrow().len())
            .field("exited", &self.exited)
            .finish()
    }
}
