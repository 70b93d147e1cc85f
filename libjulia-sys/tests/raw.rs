//! Raw FFI smoke tests. Julia can only be initialized once per process and
//! is bound to the initializing thread, so this target runs without the
//! libtest harness and executes every case on the main thread.

use libjulia_sys::*;
use std::ffi::CStr;
use std::ptr;

fn eval_simple_expression() {
    unsafe {
        let result = jl_eval_string(c"1 + 2".as_ptr());
        assert!(jl_exception_occurred().is_null());
        assert!(!result.is_null());
        assert_eq!(julia_rs_typeof(result), jl_int64_type as *mut jl_value_t);
        assert_eq!(jl_unbox_int64(result), 3);
    }
}

fn box_and_call_sqrt() {
    unsafe {
        let sqrt = jl_get_global(jl_base_module, jl_symbol(c"sqrt".as_ptr()));
        assert!(!sqrt.is_null());

        let ret = jl_call1(sqrt, jl_box_float64(2.0));
        assert!(jl_exception_occurred().is_null());
        assert_eq!(jl_unbox_float64(ret), 1.4142135623730951);

        let name = CStr::from_ptr(jl_typeof_str(ret));
        assert_eq!(name.to_str().unwrap(), "Float64");
    }
}

fn module_names() {
    unsafe {
        let main = CStr::from_ptr(julia_rs_module_name(jl_main_module));
        assert_eq!(main.to_str().unwrap(), "Main");
        let base = CStr::from_ptr(julia_rs_module_name(jl_base_module));
        assert_eq!(base.to_str().unwrap(), "Base");
    }
}

fn missing_global_is_null() {
    unsafe {
        let v = jl_get_global(jl_main_module, jl_symbol(c"no_such_binding".as_ptr()));
        assert!(v.is_null());
    }
}

fn exception_slot() {
    unsafe {
        let ret = jl_eval_string(c"error(\"boom\")".as_ptr());
        assert!(ret.is_null());
        assert!(!jl_exception_occurred().is_null());

        // A successful evaluation clears the slot.
        jl_eval_string(c"nothing".as_ptr());
        assert!(jl_exception_occurred().is_null());
    }
}

fn rooted_array_survives_gc() {
    unsafe {
        let atype = jl_apply_array_type(jl_float64_type as *mut jl_value_t, 1);
        let arr = jl_alloc_array_1d(atype, 4);

        let mut frame: [*mut jl_value_t; 3] = [ptr::null_mut(); 3];
        frame[2] = arr as *mut jl_value_t;
        julia_rs_gc_push(frame.as_mut_ptr(), 1);

        assert_eq!(julia_rs_array_len(arr), 4);
        let data = julia_rs_array_data(arr) as *mut f64;
        for i in 0..4 {
            *data.add(i) = i as f64;
        }

        jl_eval_string(c"GC.gc()".as_ptr());
        assert!(jl_exception_occurred().is_null());

        let data_after = julia_rs_array_data(arr) as *mut f64;
        assert_eq!(data, data_after);
        assert_eq!(*data_after.add(3), 3.0);

        assert_eq!(julia_rs_gc_pop(frame.as_mut_ptr()), 1);
    }
}

fn pop_of_non_innermost_frame_is_refused() {
    unsafe {
        let mut outer: [*mut jl_value_t; 3] = [ptr::null_mut(); 3];
        let mut inner: [*mut jl_value_t; 3] = [ptr::null_mut(); 3];
        outer[2] = jl_nothing;
        inner[2] = jl_nothing;
        julia_rs_gc_push(outer.as_mut_ptr(), 1);
        julia_rs_gc_push(inner.as_mut_ptr(), 1);

        assert_eq!(julia_rs_gc_pop(outer.as_mut_ptr()), 0);
        assert_eq!(julia_rs_gc_pop(inner.as_mut_ptr()), 1);
        assert_eq!(julia_rs_gc_pop(outer.as_mut_ptr()), 1);
    }
}

fn main() {
    let cases: &[(&str, fn())] = &[
        ("eval_simple_expression", eval_simple_expression),
        ("box_and_call_sqrt", box_and_call_sqrt),
        ("module_names", module_names),
        ("missing_global_is_null", missing_global_is_null),
        ("exception_slot", exception_slot),
        ("rooted_array_survives_gc", rooted_array_survives_gc),
        (
            "pop_of_non_innermost_frame_is_refused",
            pop_of_non_innermost_frame_is_refused,
        ),
    ];

    unsafe {
        julia_rs_init();
        assert_ne!(jl_is_initialized(), 0);
    }

    println!("\nrunning {} tests", cases.len());
    for (name, case) in cases {
        case();
        println!("test {name} ... ok");
    }
    println!("\ntest result: ok. {} passed", cases.len());

    unsafe { jl_atexit_hook(0) };
}
