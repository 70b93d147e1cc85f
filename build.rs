use std::env;

fn main() {
    // Read the Julia library directory from the sys crate's metadata.
    let lib_dir = env::var("DEP_JULIA_LIB_DIR")
        .expect("DEP_JULIA_LIB_DIR not set; libjulia-sys must be built first");

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();

    // Set rpath so libjulia can be found at runtime.
    if target_os == "macos" || target_os == "linux" {
        println!("cargo:rustc-link-arg=-Wl,-rpath,{lib_dir}");
    }

    // Export executable symbols so `ccall(:symbol, ...)` can find
    // `#[julia_fn]` functions through process-wide symbol lookup.
    if target_os == "linux" {
        println!("cargo:rustc-link-arg=-rdynamic");
    }
}
