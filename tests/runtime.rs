//! Runtime-level tests. Julia can only be initialized once per process and
//! stays bound to the initializing thread, so every case shares one
//! `Runtime` and runs on the main thread without the libtest harness.

use rusty_julia::{Array, Error, Function, Runtime, Value};

fn eval_number(rt: &Runtime) {
    let val = rt.eval("1 + 2").unwrap();
    assert_eq!(val.type_name(), "Int64");
    assert_eq!(val.unbox::<i64>().unwrap(), 3);
}

fn eval_then_unbox_sqrt(rt: &Runtime) {
    let val = rt.eval("sqrt(2.0)").unwrap();
    assert!(val.is::<f64>());
    assert_eq!(val.unbox::<f64>().unwrap(), 1.4142135623730951);
}

fn eval_for_side_effect(rt: &Runtime) {
    let val = rt.eval("println(sqrt(2.0))").unwrap();
    assert!(val.is_nothing());
    rt.flush_streams().unwrap();
}

fn call_by_name(rt: &Runtime) {
    let sqrt = rt.base().function("sqrt").unwrap();
    let ret = sqrt.call1(Value::new(rt, 2.0)).unwrap();
    assert_eq!(ret.unbox::<f64>().unwrap(), std::f64::consts::SQRT_2);

    let x: f64 = sqrt.invoke(16.0).unwrap();
    assert_eq!(x, 4.0);
}

fn call_with_several_arguments(rt: &Runtime) {
    let plus = rt.base().function("+").unwrap();
    let a = rt.root(Value::new(rt, 40.5));
    let sum = unsafe { plus.call2(a.get(), Value::new(rt, 1.5)) }.unwrap();
    assert_eq!(sum.unbox::<f64>().unwrap(), 42.0);

    // Small integers are cached singletons and need no roots.
    let args = [Value::new(rt, 1i64), Value::new(rt, 2i64), Value::new(rt, 3i64)];
    let sum = unsafe { plus.call(&args) }.unwrap();
    assert_eq!(sum.unbox::<i64>().unwrap(), 6);

    let time_ns = rt.base().function("time_ns").unwrap();
    assert!(time_ns.call0().unwrap().unbox::<u64>().unwrap() > 0);
}

fn define_then_call(rt: &Runtime) {
    rt.eval("my_func(x) = 2*x").unwrap();
    let func = rt.main_module().function("my_func").unwrap();
    let ret = func.call1(Value::new(rt, 5.0)).unwrap();
    assert_eq!(ret.unbox::<f64>().unwrap(), 10.0);

    // Redefinition is picked up by a fresh lookup.
    rt.eval("my_func(x) = 3*x").unwrap();
    let func = rt.main_module().function("my_func").unwrap();
    assert_eq!(func.invoke::<f64, f64>(5.0).unwrap(), 15.0);
}

fn undefined_function(rt: &Runtime) {
    let err = rt.main_module().function("no_such_function").unwrap_err();
    assert_eq!(
        err,
        Error::UndefinedFunction {
            module: "Main".into(),
            name: "no_such_function".into(),
        }
    );
}

fn module_lookup(rt: &Runtime) {
    assert_eq!(rt.main_module().name(), "Main");
    assert_eq!(rt.base().name(), "Base");
    assert_eq!(rt.core().name(), "Core");

    let math = rt.base().submodule("Math").unwrap();
    assert_eq!(math.name(), "Math");
    assert!(rt.base().submodule("sqrt").is_err());

    rt.eval("const answer = 42").unwrap();
    let answer = rt.main_module().global("answer").unwrap().unwrap();
    assert_eq!(answer.unbox::<i64>().unwrap(), 42);
    assert!(rt.main_module().global("no_such_global").unwrap().is_none());
}

fn unbox_checks_type(rt: &Runtime) {
    let val = rt.eval("1").unwrap();
    assert_eq!(
        val.unbox::<f64>().unwrap_err(),
        Error::TypeError {
            expected: "Float64".into(),
            got: "Int64".into(),
        }
    );
    assert!(rt.eval("1.0f0").unwrap().unbox::<f64>().is_err());
    assert_eq!(rt.eval("1.0f0").unwrap().unbox::<f32>().unwrap(), 1.0);
}

fn scalar_conversions(rt: &Runtime) {
    assert!(rt.eval("true").unwrap().unbox::<bool>().unwrap());
    assert!(!Value::new(rt, false).unbox::<bool>().unwrap());
    assert_eq!(Value::new(rt, -7i8).unbox::<i8>().unwrap(), -7);
    assert_eq!(Value::new(rt, 200u8).unbox::<u8>().unwrap(), 200);
    assert_eq!(Value::new(rt, 7u32).type_name(), "UInt32");
    rt.eval("()").unwrap().unbox::<()>().unwrap_err();
    rt.eval("nothing").unwrap().unbox::<()>().unwrap();
}

fn string_conversions(rt: &Runtime) {
    let s: String = rt.eval("\"hello \" * \"world\"").unwrap().unbox().unwrap();
    assert_eq!(s, "hello world");

    let length = rt.base().function("length").unwrap();
    let n: i64 = length.invoke("héllo").unwrap();
    assert_eq!(n, 5);

    let shown = Value::new(rt, 2.5).to_display_string(rt).unwrap();
    assert_eq!(shown, "2.5");

    assert!(matches!(
        rt.eval("1\0"),
        Err(Error::InvalidString(_))
    ));
}

fn option_conversions(rt: &Runtime) {
    let none: Option<f64> = rt.eval("nothing").unwrap().unbox().unwrap();
    assert_eq!(none, None);
    let some: Option<f64> = rt.eval("0.5").unwrap().unbox().unwrap();
    assert_eq!(some, Some(0.5));
    assert!(Value::new(rt, None::<i64>).is_nothing());
}

fn reverse_array_in_place(rt: &Runtime) {
    let mut x = rt.root(Array::<f64>::new(rt, 10).unwrap());
    assert_eq!(x.len(), 10);
    assert!(x.as_slice().iter().all(|v| *v == 0.0));

    for (i, v) in x.as_mut_slice().iter_mut().enumerate() {
        *v = i as f64;
    }
    let data = x.data_ptr();

    rt.base().function("reverse!").unwrap().call1(x.as_value()).unwrap();

    assert_eq!(x.data_ptr(), data);
    assert_eq!(
        x.to_vec(),
        vec![9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0, 0.0]
    );
}

fn rooted_array_survives_gc(rt: &Runtime) {
    let mut x = rt.root(Array::<i64>::new(rt, 1000).unwrap());
    for (i, v) in x.as_mut_slice().iter_mut().enumerate() {
        *v = i as i64;
    }

    // Churn the heap and force full collections.
    rt.eval("for _ in 1:100; zeros(10_000); end; GC.gc(true)").unwrap();

    let sum = rt.base().function("sum").unwrap();
    let total: i64 = sum.call1(x.as_value()).unwrap().unbox().unwrap();
    assert_eq!(total, (0..1000).sum::<i64>());
}

fn nested_roots(rt: &Runtime) {
    let outer = rt.root(rt.eval("[1.0, 2.0]").unwrap());
    {
        let inner = rt.root(Function::new(rt, rt.eval("x -> 2x").unwrap()));
        let doubled = rt.root(inner.call1(outer.get()).unwrap());
        let arr = rt.root(Array::<f64>::from_value(rt, doubled.get()).unwrap());
        assert_eq!(arr.as_slice(), &[2.0, 4.0]);
    }
    assert_eq!(outer.type_name(), "Array");
}

fn array_from_value_checks_element_type(rt: &Runtime) {
    let v = rt.eval("[1.0, 2.0, 3.0]").unwrap();
    let arr = Array::<f64>::from_value(rt, v).unwrap();
    assert_eq!(arr.len(), 3);

    assert!(matches!(
        Array::<i64>::from_value(rt, v),
        Err(Error::TypeError { .. })
    ));
    let matrix = rt.eval("zeros(2, 2)").unwrap();
    assert!(Array::<f64>::from_value(rt, matrix).is_err());

    let empty = rt.root(Array::<u8>::new(rt, 0).unwrap());
    assert!(empty.is_empty());
    assert_eq!(empty.as_slice(), &[] as &[u8]);
}

fn impossible_array_length_is_an_error(rt: &Runtime) {
    let err = Array::<f64>::new(rt, usize::MAX).unwrap_err();
    assert!(matches!(err, Error::Exception { ref type_name, .. } if type_name == "ArgumentError"));

    // Representable, but far beyond any address space.
    let err = Array::<f64>::new(rt, 1 << 60).unwrap_err();
    assert!(matches!(err, Error::Exception { .. }), "{err:?}");
    assert!(rt.exception().is_some());
    rt.clear_exception();

    // The runtime is still usable.
    let ok = rt.root(Array::<f64>::new(rt, 4).unwrap());
    assert_eq!(ok.to_vec(), vec![0.0; 4]);
}

fn display_string_under_trace_logging(rt: &Runtime) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(std::io::sink)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        for i in 0..2000 {
            let x = i as f64 + 0.5;
            let shown = Value::new(rt, x).to_display_string(rt).unwrap();
            assert_eq!(shown, x.to_string());
        }
        assert_eq!(rt.base().name(), "Base");
    });
}

fn exception_is_reported_and_cleared(rt: &Runtime) {
    let err = rt.eval("this_function_does_not_exist()").unwrap_err();
    match &err {
        Error::Exception { type_name, message } => {
            assert_eq!(type_name, "UndefVarError");
            assert!(message.contains("this_function_does_not_exist"), "{message}");
        }
        other => panic!("expected an exception, got {other:?}"),
    }

    let exc = rt.exception().expect("error slot should be set");
    assert_eq!(exc.type_name(), "UndefVarError");
    assert_eq!(exc.to_error(), err);

    assert!(rt.report_exception());
    assert!(rt.exception().is_none());
    assert!(!rt.report_exception());
    rt.flush_streams().unwrap();
}

fn failing_show_is_surfaced(rt: &Runtime) {
    rt.eval("struct Unshowable <: Exception end").unwrap();
    rt.eval("Base.show(io::IO, ::Unshowable) = error(\"cannot show\")").unwrap();

    assert!(rt.eval("throw(Unshowable())").is_err());
    let exc = rt.exception().unwrap();
    assert_eq!(exc.type_name(), "Unshowable");

    assert_eq!(
        exc.show().unwrap_err(),
        Error::Exception {
            type_name: "ErrorException".into(),
            message: "cannot show".into(),
        }
    );
    assert_eq!(rt.exception().unwrap().type_name(), "ErrorException");

    assert!(rt.report_exception());
    assert!(rt.exception().is_none());
}

fn exception_from_call(rt: &Runtime) {
    let err = rt
        .base()
        .function("sqrt")
        .unwrap()
        .call1(Value::new(rt, -1.0))
        .unwrap_err();
    assert!(matches!(err, Error::Exception { ref type_name, .. } if type_name == "DomainError"));
    assert!(rt.exception().is_some());

    rt.clear_exception();
    assert!(rt.exception().is_none());
}

fn successful_call_clears_slot(rt: &Runtime) {
    assert!(rt.eval("error(\"boom\")").is_err());
    assert_eq!(rt.exception().unwrap().message(), "boom");
    rt.eval("nothing").unwrap();
    assert!(rt.exception().is_none());
}

fn second_init_fails(_rt: &Runtime) {
    assert_eq!(Runtime::init().unwrap_err(), Error::AlreadyInitialized);
}

fn main() {
    let cases: &[(&str, fn(&Runtime))] = &[
        ("eval_number", eval_number),
        ("eval_then_unbox_sqrt", eval_then_unbox_sqrt),
        ("eval_for_side_effect", eval_for_side_effect),
        ("call_by_name", call_by_name),
        ("call_with_several_arguments", call_with_several_arguments),
        ("define_then_call", define_then_call),
        ("undefined_function", undefined_function),
        ("module_lookup", module_lookup),
        ("unbox_checks_type", unbox_checks_type),
        ("scalar_conversions", scalar_conversions),
        ("string_conversions", string_conversions),
        ("option_conversions", option_conversions),
        ("reverse_array_in_place", reverse_array_in_place),
        ("rooted_array_survives_gc", rooted_array_survives_gc),
        ("nested_roots", nested_roots),
        (
            "array_from_value_checks_element_type",
            array_from_value_checks_element_type,
        ),
        (
            "exception_is_reported_and_cleared",
            exception_is_reported_and_cleared,
        ),
        (
            "impossible_array_length_is_an_error",
            impossible_array_length_is_an_error,
        ),
        (
            "display_string_under_trace_logging",
            display_string_under_trace_logging,
        ),
        ("failing_show_is_surfaced", failing_show_is_surfaced),
        ("exception_from_call", exception_from_call),
        ("successful_call_clears_slot", successful_call_clears_slot),
        ("second_init_fails", second_init_fails),
    ];

    let rt = Runtime::init().expect("Julia should initialize");

    println!("\nrunning {} tests", cases.len());
    for (name, case) in cases {
        case(&rt);
        println!("test {name} ... ok");
    }
    println!("\ntest result: ok. {} passed", cases.len());

    assert_eq!(rt.shutdown(0), 0);
}
