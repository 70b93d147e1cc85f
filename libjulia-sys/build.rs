use std::env;
use std::path::PathBuf;
use std::process::Command;

/// Locate the Julia installation: `JULIA_DIR` wins, otherwise ask the
/// `julia` binary on `PATH` where it lives.
fn julia_dir() -> PathBuf {
    if let Ok(dir) = env::var("JULIA_DIR") {
        return PathBuf::from(dir);
    }

    let out = Command::new("julia")
        .args(["--startup-file=no", "-e", "print(dirname(Sys.BINDIR))"])
        .output()
        .expect("JULIA_DIR not set and `julia` could not be run from PATH");
    assert!(
        out.status.success(),
        "`julia` exited with {} while locating its install directory",
        out.status
    );
    let dir = String::from_utf8(out.stdout).expect("Julia install path is not UTF-8");
    PathBuf::from(dir.trim())
}

fn main() {
    println!("cargo:rerun-if-changed=src/shim.c");
    println!("cargo:rerun-if-env-changed=JULIA_DIR");

    let julia_dir = julia_dir();
    let include_dir = julia_dir.join("include").join("julia");
    let lib_dir = julia_dir.join("lib");

    // Expose the library directory to dependent crates via DEP_JULIA_LIB_DIR.
    println!("cargo:lib_dir={}", lib_dir.display());

    // The shim wraps the parts of julia.h that are macros or inline
    // functions and therefore have no exported symbol.
    cc::Build::new()
        .file("src/shim.c")
        .include(&include_dir)
        .flag_if_supported("-std=gnu11")
        .flag_if_supported("-fPIC")
        .compile("julia_shim");

    println!("cargo:rustc-link-search=native={}", lib_dir.display());
    println!("cargo:rustc-link-lib=dylib=julia");

    // rpath for this crate's own test binaries; dependents set theirs from
    // DEP_JULIA_LIB_DIR.
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "macos" || target_os == "linux" {
        println!("cargo:rustc-link-arg=-Wl,-rpath,{}", lib_dir.display());
    }
}
