use libjulia_sys::*;

use crate::Runtime;
use crate::error::{Error, Result};
use crate::value::Value;

/// Convert a Rust value into a Julia [`Value`] (boxing).
pub trait IntoJulia<'rt> {
    fn into_julia(self, rt: &'rt Runtime) -> Value<'rt>;
}

/// Extract a Rust value from a Julia [`Value`] (unboxing).
///
/// Implementations check the Julia type first and return
/// [`Error::TypeError`] on a mismatch rather than reading the wrong layout.
pub trait FromJulia<'rt>: Sized {
    fn from_julia(value: &Value<'rt>) -> Result<Self>;
}

/// A bits type whose Rust and Julia representations are identical, so it
/// can be boxed, unboxed and used as an array element type.
///
/// # Safety
/// `julia_type` must return the Julia datatype with exactly the layout of
/// `Self`.
pub unsafe trait JuliaScalar: Copy + 'static + for<'rt> IntoJulia<'rt> + for<'rt> FromJulia<'rt> {
    /// Julia-side type name, e.g. `"Float64"`.
    const JULIA_NAME: &'static str;

    fn julia_type() -> *mut jl_datatype_t;
}

macro_rules! impl_scalar {
    ($($ty:ty => $name:literal, $jl_type:ident, $box_fn:ident, $unbox_fn:ident;)*) => { $(
        unsafe impl JuliaScalar for $ty {
            const JULIA_NAME: &'static str = $name;

            fn julia_type() -> *mut jl_datatype_t {
                unsafe { $jl_type }
            }
        }

        impl<'rt> IntoJulia<'rt> for $ty {
            fn into_julia(self, rt: &'rt Runtime) -> Value<'rt> {
                unsafe { Value::from_raw(rt, $box_fn(self)) }
            }
        }

        impl<'rt> FromJulia<'rt> for $ty {
            fn from_julia(value: &Value<'rt>) -> Result<Self> {
                value.check_type::<$ty>()?;
                Ok(unsafe { $unbox_fn(value.as_raw()) })
            }
        }
    )* };
}

impl_scalar! {
    f64 => "Float64", jl_float64_type, jl_box_float64, jl_unbox_float64;
    f32 => "Float32", jl_float32_type, jl_box_float32, jl_unbox_float32;
    i64 => "Int64", jl_int64_type, jl_box_int64, jl_unbox_int64;
    i32 => "Int32", jl_int32_type, jl_box_int32, jl_unbox_int32;
    i16 => "Int16", jl_int16_type, jl_box_int16, jl_unbox_int16;
    i8 => "Int8", jl_int8_type, jl_box_int8, jl_unbox_int8;
    u64 => "UInt64", jl_uint64_type, jl_box_uint64, jl_unbox_uint64;
    u32 => "UInt32", jl_uint32_type, jl_box_uint32, jl_unbox_uint32;
    u16 => "UInt16", jl_uint16_type, jl_box_uint16, jl_unbox_uint16;
    u8 => "UInt8", jl_uint8_type, jl_box_uint8, jl_unbox_uint8;
}

// Julia's Bool is one byte holding 0 or 1, the same as Rust's.
unsafe impl JuliaScalar for bool {
    const JULIA_NAME: &'static str = "Bool";

    fn julia_type() -> *mut jl_datatype_t {
        unsafe { jl_bool_type }
    }
}

impl<'rt> IntoJulia<'rt> for bool {
    fn into_julia(self, rt: &'rt Runtime) -> Value<'rt> {
        unsafe { Value::from_raw(rt, jl_box_bool(self as i8)) }
    }
}

impl<'rt> FromJulia<'rt> for bool {
    fn from_julia(value: &Value<'rt>) -> Result<Self> {
        value.check_type::<bool>()?;
        Ok(unsafe { jl_unbox_bool(value.as_raw()) } != 0)
    }
}

// -- non-scalar conversions ---------------------------------------------------

impl<'rt> IntoJulia<'rt> for Value<'rt> {
    fn into_julia(self, _rt: &'rt Runtime) -> Value<'rt> {
        self
    }
}

impl<'rt> FromJulia<'rt> for Value<'rt> {
    fn from_julia(value: &Value<'rt>) -> Result<Self> {
        Ok(*value)
    }
}

impl<'rt> IntoJulia<'rt> for () {
    fn into_julia(self, rt: &'rt Runtime) -> Value<'rt> {
        Value::nothing(rt)
    }
}

impl<'rt> FromJulia<'rt> for () {
    fn from_julia(value: &Value<'rt>) -> Result<Self> {
        if value.is_nothing() {
            Ok(())
        } else {
            Err(Error::TypeError {
                expected: "Nothing".into(),
                got: value.type_name(),
            })
        }
    }
}

impl<'rt> IntoJulia<'rt> for &str {
    fn into_julia(self, rt: &'rt Runtime) -> Value<'rt> {
        unsafe { Value::from_raw(rt, jl_pchar_to_string(self.as_ptr().cast(), self.len())) }
    }
}

impl<'rt> IntoJulia<'rt> for String {
    fn into_julia(self, rt: &'rt Runtime) -> Value<'rt> {
        self.as_str().into_julia(rt)
    }
}

impl<'rt> FromJulia<'rt> for String {
    fn from_julia(value: &Value<'rt>) -> Result<Self> {
        let raw = value.as_raw();
        if unsafe { julia_rs_typeof(raw) } != unsafe { jl_string_type }.cast::<jl_value_t>() {
            return Err(Error::TypeError {
                expected: "String".into(),
                got: value.type_name(),
            });
        }
        // A Julia String stores its byte length in the first word, followed
        // by the bytes; `jl_string_ptr` points at the bytes.
        let bytes = unsafe {
            let len = *(raw as *const usize);
            std::slice::from_raw_parts(jl_string_ptr(raw).cast::<u8>(), len)
        };
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

impl<'rt, T: IntoJulia<'rt>> IntoJulia<'rt> for Option<T> {
    fn into_julia(self, rt: &'rt Runtime) -> Value<'rt> {
        match self {
            Some(v) => v.into_julia(rt),
            None => Value::nothing(rt),
        }
    }
}

impl<'rt, T: FromJulia<'rt>> FromJulia<'rt> for Option<T> {
    fn from_julia(value: &Value<'rt>) -> Result<Self> {
        if value.is_nothing() {
            Ok(None)
        } else {
            T::from_julia(value).map(Some)
        }
    }
}
