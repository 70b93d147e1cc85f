use libjulia_sys::*;

use crate::Runtime;
use crate::convert::{FromJulia, IntoJulia};
use crate::error::Result;
use crate::value::Value;

/// A callable Julia value, usually resolved with
/// [`Module::function`](crate::Module::function).
#[derive(Clone, Copy)]
pub struct Function<'rt> {
    value: Value<'rt>,
    rt: &'rt Runtime,
}

impl<'rt> Function<'rt> {
    /// Treat any value as callable. Calling a non-callable value raises a
    /// `MethodError` on the Julia side.
    pub fn new(rt: &'rt Runtime, value: Value<'rt>) -> Self {
        Function { value, rt }
    }

    /// The callable as a plain value.
    pub fn as_value(&self) -> Value<'rt> {
        self.value
    }

    /// Call with no arguments.
    pub fn call0(&self) -> Result<Value<'rt>> {
        tracing::debug!(nargs = 0, "calling Julia function");
        let raw = unsafe { jl_call0(self.value.as_raw()) };
        Value::checked(self.rt, raw)
    }

    /// Call with one argument.
    pub fn call1(&self, arg: Value<'rt>) -> Result<Value<'rt>> {
        tracing::debug!(nargs = 1, "calling Julia function");
        let raw = unsafe { jl_call1(self.value.as_raw(), arg.as_raw()) };
        Value::checked(self.rt, raw)
    }

    /// Call with two arguments.
    ///
    /// # Safety
    /// Both arguments must still be alive. Allocating the second argument
    /// can collect the first unless it is rooted, globally bound, or a
    /// singleton; use [`Runtime::root`](crate::Runtime::root) when in doubt.
    ///
    /// ```rust,no_run
    /// # use rusty_julia::{Runtime, Value};
    /// # let rt = Runtime::init().unwrap();
    /// let plus = rt.base().function("+").unwrap();
    /// let a = rt.root(Value::new(&rt, 1.5));
    /// let b = Value::new(&rt, 2.5);
    /// let sum = unsafe { plus.call2(a.get(), b) }.unwrap();
    /// ```
    pub unsafe fn call2(&self, a: Value<'rt>, b: Value<'rt>) -> Result<Value<'rt>> {
        tracing::debug!(nargs = 2, "calling Julia function");
        let raw = unsafe { jl_call2(self.value.as_raw(), a.as_raw(), b.as_raw()) };
        Value::checked(self.rt, raw)
    }

    /// Call with any number of arguments.
    ///
    /// # Safety
    /// Same as [`call2`](Self::call2): every argument must still be alive.
    pub unsafe fn call(&self, args: &[Value<'rt>]) -> Result<Value<'rt>> {
        tracing::debug!(nargs = args.len(), "calling Julia function");
        // `jl_call` does not write through `args`; `Value` is a transparent
        // wrapper around `jl_value_t *`.
        let raw = unsafe {
            jl_call(
                self.value.as_raw(),
                args.as_ptr() as *mut *mut jl_value_t,
                args.len() as u32,
            )
        };
        Value::checked(self.rt, raw)
    }

    /// Box `arg`, call, and unbox the result.
    ///
    /// ```rust,no_run
    /// # let rt = rusty_julia::Runtime::init().unwrap();
    /// let sqrt = rt.base().function("sqrt").unwrap();
    /// let x: f64 = sqrt.invoke(2.0).unwrap();
    /// assert_eq!(x, std::f64::consts::SQRT_2);
    /// ```
    pub fn invoke<A, R>(&self, arg: A) -> Result<R>
    where
        A: IntoJulia<'rt>,
        R: FromJulia<'rt>,
    {
        let arg = arg.into_julia(self.rt);
        self.call1(arg)?.unbox()
    }
}

impl std::fmt::Debug for Function<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Function({:?})", self.value.as_raw())
    }
}
