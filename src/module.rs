use std::ffi::CString;
use std::ptr::NonNull;

use libjulia_sys::*;

use crate::Runtime;
use crate::error::{Error, Result, cstr_lossy};
use crate::function::Function;
use crate::value::Value;

/// A Julia module handle (`Main`, `Base`, `Core`, or a submodule).
#[derive(Clone, Copy)]
pub struct Module<'rt> {
    raw: NonNull<jl_module_t>,
    rt: &'rt Runtime,
}

impl<'rt> Module<'rt> {
    /// # Safety
    /// `raw` must be a non-null pointer to a live module.
    pub(crate) unsafe fn from_raw(rt: &'rt Runtime, raw: *mut jl_module_t) -> Self {
        Module {
            raw: unsafe { NonNull::new_unchecked(raw) },
            rt,
        }
    }

    /// The underlying `jl_module_t *`.
    pub fn as_raw(&self) -> *mut jl_module_t {
        self.raw.as_ptr()
    }

    /// The module's own name, e.g. `"Main"` or `"Math"` for `Base.Math`.
    ///
    /// Read straight from the module object; no Julia code runs, so it is
    /// safe to call while other values are unrooted.
    pub fn name(&self) -> String {
        unsafe { cstr_lossy(julia_rs_module_name(self.as_raw())) }
    }

    /// Look up a global binding. Returns `Ok(None)` if it is not defined.
    pub fn global(&self, name: &str) -> Result<Option<Value<'rt>>> {
        let c_name = CString::new(name).map_err(|_| Error::InvalidString(name.into()))?;
        let raw = unsafe { jl_get_global(self.as_raw(), jl_symbol(c_name.as_ptr())) };
        if raw.is_null() {
            return Ok(None);
        }
        Ok(Some(unsafe { Value::from_raw(self.rt, raw) }))
    }

    /// Resolve a function by name.
    pub fn function(&self, name: &str) -> Result<Function<'rt>> {
        match self.global(name)? {
            Some(v) => {
                tracing::debug!(module = %self.name(), function = name, "resolved function");
                Ok(Function::new(self.rt, v))
            }
            None => Err(Error::UndefinedFunction {
                module: self.name(),
                name: name.into(),
            }),
        }
    }

    /// Resolve a submodule bound in this module, e.g. `Base.submodule("Math")`.
    pub fn submodule(&self, name: &str) -> Result<Module<'rt>> {
        let v = self.global(name)?.ok_or_else(|| Error::TypeError {
            expected: "Module".into(),
            got: format!("undefined binding `{name}`"),
        })?;
        if v.type_name() != "Module" {
            return Err(Error::TypeError {
                expected: "Module".into(),
                got: v.type_name(),
            });
        }
        Ok(unsafe { Module::from_raw(self.rt, v.as_raw().cast()) })
    }

    /// The module as a plain value.
    pub fn as_value(&self) -> Value<'rt> {
        unsafe { Value::from_raw(self.rt, self.as_raw().cast()) }
    }
}

impl std::fmt::Debug for Module<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Module({})", self.name())
    }
}
