//! Raw bindings to the Julia embedding API (`libjulia`).
//!
//! Exported functions and globals are declared directly. Everything that
//! `julia.h` only provides as a macro or inline function (GC frames, array
//! data, `jl_typeof`, initialization) goes through a small C shim compiled
//! by the build script; those functions carry a `julia_rs_` prefix.
//!
//! # Example
//!
//! ```rust,no_run
//! use libjulia_sys::*;
//!
//! unsafe {
//!     julia_rs_init();
//!     let v = jl_eval_string(c"sqrt(2.0)".as_ptr());
//!     assert!(jl_exception_occurred().is_null());
//!     assert_eq!(jl_unbox_float64(v), 2.0f64.sqrt());
//!     jl_atexit_hook(0);
//! }
//! ```

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::ffi::{c_char, c_int, c_void};

#[repr(C)]
pub struct jl_value_t {
    _private: [u8; 0],
}

#[repr(C)]
pub struct jl_module_t {
    _private: [u8; 0],
}

#[repr(C)]
pub struct jl_datatype_t {
    _private: [u8; 0],
}

#[repr(C)]
pub struct jl_array_t {
    _private: [u8; 0],
}

#[repr(C)]
pub struct jl_sym_t {
    _private: [u8; 0],
}

/// Runtime-owned I/O stream (`JL_STREAM`).
#[repr(C)]
pub struct JL_STREAM {
    _private: [u8; 0],
}

pub type jl_function_t = jl_value_t;

unsafe extern "C" {
    // -- globals ---------------------------------------------------------------

    pub static mut jl_main_module: *mut jl_module_t;
    pub static mut jl_base_module: *mut jl_module_t;
    pub static mut jl_core_module: *mut jl_module_t;
    pub static mut jl_nothing: *mut jl_value_t;

    pub static mut jl_float64_type: *mut jl_datatype_t;
    pub static mut jl_float32_type: *mut jl_datatype_t;
    pub static mut jl_int64_type: *mut jl_datatype_t;
    pub static mut jl_int32_type: *mut jl_datatype_t;
    pub static mut jl_int16_type: *mut jl_datatype_t;
    pub static mut jl_int8_type: *mut jl_datatype_t;
    pub static mut jl_uint64_type: *mut jl_datatype_t;
    pub static mut jl_uint32_type: *mut jl_datatype_t;
    pub static mut jl_uint16_type: *mut jl_datatype_t;
    pub static mut jl_uint8_type: *mut jl_datatype_t;
    pub static mut jl_bool_type: *mut jl_datatype_t;
    pub static mut jl_string_type: *mut jl_datatype_t;

    // -- lifecycle -------------------------------------------------------------

    pub fn jl_is_initialized() -> c_int;
    pub fn jl_atexit_hook(status: c_int);

    // -- evaluation and calls --------------------------------------------------

    pub fn jl_eval_string(code: *const c_char) -> *mut jl_value_t;
    pub fn jl_call(f: *mut jl_function_t, args: *mut *mut jl_value_t, nargs: u32)
    -> *mut jl_value_t;
    pub fn jl_call0(f: *mut jl_function_t) -> *mut jl_value_t;
    pub fn jl_call1(f: *mut jl_function_t, a: *mut jl_value_t) -> *mut jl_value_t;
    pub fn jl_call2(
        f: *mut jl_function_t,
        a: *mut jl_value_t,
        b: *mut jl_value_t,
    ) -> *mut jl_value_t;

    // -- current-error slot ----------------------------------------------------

    pub fn jl_exception_occurred() -> *mut jl_value_t;
    pub fn jl_exception_clear();

    // -- symbols and globals ---------------------------------------------------

    pub fn jl_symbol(name: *const c_char) -> *mut jl_sym_t;
    pub fn jl_get_global(m: *mut jl_module_t, var: *mut jl_sym_t) -> *mut jl_value_t;

    // -- boxing ----------------------------------------------------------------

    pub fn jl_box_bool(x: i8) -> *mut jl_value_t;
    pub fn jl_box_int8(x: i8) -> *mut jl_value_t;
    pub fn jl_box_uint8(x: u8) -> *mut jl_value_t;
    pub fn jl_box_int16(x: i16) -> *mut jl_value_t;
    pub fn jl_box_uint16(x: u16) -> *mut jl_value_t;
    pub fn jl_box_int32(x: i32) -> *mut jl_value_t;
    pub fn jl_box_uint32(x: u32) -> *mut jl_value_t;
    pub fn jl_box_int64(x: i64) -> *mut jl_value_t;
    pub fn jl_box_uint64(x: u64) -> *mut jl_value_t;
    pub fn jl_box_float32(x: f32) -> *mut jl_value_t;
    pub fn jl_box_float64(x: f64) -> *mut jl_value_t;

    pub fn jl_unbox_bool(v: *mut jl_value_t) -> i8;
    pub fn jl_unbox_int8(v: *mut jl_value_t) -> i8;
    pub fn jl_unbox_uint8(v: *mut jl_value_t) -> u8;
    pub fn jl_unbox_int16(v: *mut jl_value_t) -> i16;
    pub fn jl_unbox_uint16(v: *mut jl_value_t) -> u16;
    pub fn jl_unbox_int32(v: *mut jl_value_t) -> i32;
    pub fn jl_unbox_uint32(v: *mut jl_value_t) -> u32;
    pub fn jl_unbox_int64(v: *mut jl_value_t) -> i64;
    pub fn jl_unbox_uint64(v: *mut jl_value_t) -> u64;
    pub fn jl_unbox_float32(v: *mut jl_value_t) -> f32;
    pub fn jl_unbox_float64(v: *mut jl_value_t) -> f64;

    // -- arrays ----------------------------------------------------------------

    pub fn jl_apply_array_type(elty: *mut jl_value_t, dim: usize) -> *mut jl_value_t;
    pub fn jl_alloc_array_1d(atype: *mut jl_value_t, nr: usize) -> *mut jl_array_t;

    // -- strings and introspection --------------------------------------------

    pub fn jl_typeof_str(v: *mut jl_value_t) -> *const c_char;
    pub fn jl_string_ptr(s: *mut jl_value_t) -> *const c_char;
    pub fn jl_pchar_to_string(str: *const c_char, len: usize) -> *mut jl_value_t;

    // -- runtime streams -------------------------------------------------------

    pub fn jl_stdout_obj() -> *mut jl_value_t;
    pub fn jl_stderr_obj() -> *mut jl_value_t;
    pub fn jl_stderr_stream() -> *mut JL_STREAM;
    pub fn jl_printf(s: *mut JL_STREAM, format: *const c_char, ...) -> c_int;

    // -- shim (src/shim.c) -----------------------------------------------------

    pub fn julia_rs_init();
    pub fn julia_rs_init_with_image(bindir: *const c_char, image: *const c_char);
    pub fn julia_rs_typeof(v: *mut jl_value_t) -> *mut jl_value_t;
    /// The module's own (unqualified) name. Does not allocate.
    pub fn julia_rs_module_name(m: *mut jl_module_t) -> *const c_char;
    pub fn julia_rs_array_data(a: *mut jl_array_t) -> *mut c_void;
    pub fn julia_rs_array_len(a: *mut jl_array_t) -> usize;
    /// `frame` must point at `nroots + 2` writable pointer slots that stay at
    /// a fixed address until the matching [`julia_rs_gc_pop`].
    pub fn julia_rs_gc_push(frame: *mut *mut jl_value_t, nroots: usize);
    /// Returns 0 if `frame` is not the innermost frame; the stack is left
    /// untouched in that case.
    pub fn julia_rs_gc_pop(frame: *mut *mut jl_value_t) -> c_int;
}
