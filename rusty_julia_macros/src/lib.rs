mod native;

use proc_macro::TokenStream;
use syn::{ItemFn, parse_macro_input};

/// Expose a Rust function to Julia as a native (`ccall`-able) function.
///
/// ```ignore
/// #[julia_fn]
/// fn my_c_sqrt(x: f64) -> f64 {
///     x.sqrt()
/// }
///
/// // Register with:
/// my_c_sqrt::register(&rt)?;
/// // or inspect the descriptor:
/// let f = my_c_sqrt::native();
/// ```
///
/// The function body is compiled as an ordinary Rust function. The macro
/// adds an `extern "C"` trampoline exported under the function's own name
/// (so `ccall(:my_c_sqrt, ...)` finds it by symbol lookup) and a unit struct
/// with the function's name carrying `native()` and `register(&Runtime)`.
///
/// Argument and return types must implement `rusty_julia::NativeType`.
/// Use `#[julia_fn(name = "customName")]` to change the name of the Julia
/// wrapper defined by `register`; the exported symbol keeps the Rust name.
#[proc_macro_attribute]
pub fn julia_fn(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as native::NativeArgs);
    let func = parse_macro_input!(item as ItemFn);
    native::expand(&args, &func)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
