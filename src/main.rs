//! Embedding demo: initializes Julia, exercises each marshaling path once,
//! in order, and shuts the runtime down with the requested exit code.
//!
//! Run with:
//!   cargo run
//!   cargo run -- --exit-code 3 --verbose

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use rusty_julia::logger::{self, LogLevel};
use rusty_julia::{Array, InitOptions, Runtime, Value, julia_fn};

/// Embed Julia and drive it through evaluation, calls, arrays, native
/// callbacks and error reporting.
#[derive(Parser, Debug)]
#[command(name = "embedding", version, about, long_about = None)]
struct Args {
    /// Status passed to Julia's exit hooks and returned to the OS
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    exit_code: i32,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory containing the julia binary (overrides JULIA_BINDIR)
    #[arg(long, value_name = "DIR")]
    bindir: Option<PathBuf>,

    /// System image to load (overrides JULIA_SYSIMAGE)
    #[arg(long, value_name = "FILE")]
    image: Option<PathBuf>,
}

#[julia_fn]
fn my_c_sqrt(x: f64) -> f64 {
    x.sqrt()
}

type Block = fn(&Runtime) -> rusty_julia::Result<()>;

/// Evaluate for side effect only.
fn run_julia_code(rt: &Runtime) -> rusty_julia::Result<()> {
    rt.eval("println(sqrt(2.0))")?;
    rt.flush_streams()
}

fn return_value(rt: &Runtime) -> rusty_julia::Result<()> {
    let ret: f64 = rt.eval("sqrt(2.0)")?.unbox()?;
    println!("sqrt(2.0) in C: {ret:.6e}");
    Ok(())
}

/// Same as above, through a function handle.
fn function_handle(rt: &Runtime) -> rusty_julia::Result<()> {
    let func = rt.base().function("sqrt")?;
    let ret: f64 = func.call1(Value::new(rt, 2.0))?.unbox()?;
    println!("sqrt(2.0) in C: {ret:.6e}");
    Ok(())
}

fn arrays(rt: &Runtime) -> rusty_julia::Result<()> {
    let mut x = rt.root(Array::<f64>::new(rt, 10)?);
    for (i, v) in x.as_mut_slice().iter_mut().enumerate() {
        *v = i as f64;
    }

    let data = x.data_ptr();
    rt.base().function("reverse!")?.call1(x.as_value())?;
    debug_assert_eq!(data, x.data_ptr());

    let items: Vec<String> = x.as_slice().iter().map(|v| format!("{v:.6e}")).collect();
    println!("x = [{} ]", items.join(" "));
    Ok(())
}

fn define_and_call(rt: &Runtime) -> rusty_julia::Result<()> {
    rt.eval("my_func(x) = 2*x")?;

    let func = rt.main_module().function("my_func")?;
    let ret: f64 = func.call1(Value::new(rt, 5.0))?.unbox()?;
    println!("my_func(5.0) = {ret:.6}");
    Ok(())
}

fn call_native(rt: &Runtime) -> rusty_julia::Result<()> {
    my_c_sqrt::register(rt)?;
    rt.eval("println(ccall(:my_c_sqrt, Float64, (Float64,), 2.0))")?;
    rt.flush_streams()
}

fn check_exceptions(rt: &Runtime) -> rusty_julia::Result<()> {
    if let Err(err) = rt.eval("this_function_does_not_exist()") {
        tracing::debug!(%err, "evaluation failed");
    }
    if rt.report_exception() {
        rt.flush_streams()?;
    }
    Ok(())
}

const BLOCKS: &[(&str, Block)] = &[
    ("run julia code", run_julia_code),
    ("return value", return_value),
    ("function handle", function_handle),
    ("1d arrays", arrays),
    ("define and call", define_and_call),
    ("call native function", call_native),
    ("check for exceptions", check_exceptions),
];

fn run(args: &Args) -> anyhow::Result<i32> {
    let mut options = InitOptions::new();
    if let Some(dir) = &args.bindir {
        options = options.bindir(dir);
    }
    if let Some(image) = &args.image {
        options = options.image(image);
    }
    let options = options.or(InitOptions::from_env());

    let rt = Runtime::init_with(options).context("failed to initialize Julia")?;

    // A failing block is reported and the rest still run.
    for (name, block) in BLOCKS {
        if let Err(err) = block(&rt) {
            tracing::error!(block = name, %err, "demonstration block failed");
        }
    }

    Ok(rt.shutdown(args.exit_code))
}

fn main() {
    let args = Args::parse();
    logger::init_with_level(if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            1
        }
    };
    process::exit(code);
}
