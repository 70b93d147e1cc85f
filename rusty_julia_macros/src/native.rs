use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{FnArg, ItemFn, LitStr, Pat, ReturnType, Token, parse::Parse, parse::ParseStream};

// Mirrors `rusty_julia::native`; the registry checks again at runtime.
const RESERVED: &[&str] = &[
    "baremodule", "begin", "break", "catch", "const", "continue", "do", "else", "elseif", "end",
    "export", "false", "finally", "for", "function", "global", "if", "import", "let", "local",
    "macro", "module", "public", "quote", "return", "struct", "true", "try", "using", "while",
];

/// Why `name` cannot name a Julia wrapper, if it cannot.
fn julia_name_error(name: &str) -> Option<String> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Some("Julia name cannot be empty".into());
    };
    if !(first.is_ascii_alphabetic() || first == '_')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '!')
    {
        return Some(format!("`{name}` is not a valid Julia identifier"));
    }
    if RESERVED.contains(&name) {
        return Some(format!("`{name}` is a reserved word in Julia"));
    }
    None
}

/// `#[julia_fn]` or `#[julia_fn(name = "wrapper_name")]`.
pub struct NativeArgs {
    pub name: Option<LitStr>,
}

impl Parse for NativeArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(NativeArgs { name: None });
        }
        let key: syn::Ident = input.parse()?;
        if key != "name" {
            return Err(syn::Error::new_spanned(key, "unknown #[julia_fn] option, expected `name`"));
        }
        input.parse::<Token![=]>()?;
        let lit: LitStr = input.parse()?;
        if let Some(reason) = julia_name_error(&lit.value()) {
            return Err(syn::Error::new_spanned(&lit, reason));
        }
        input.parse::<Option<Token![,]>>()?;
        if !input.is_empty() {
            return Err(input.error("#[julia_fn] takes a single `name = \"...\"` option"));
        }
        Ok(NativeArgs { name: Some(lit) })
    }
}

pub fn expand(args: &NativeArgs, func: &ItemFn) -> syn::Result<TokenStream> {
    let sig = &func.sig;
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(asyncness, "#[julia_fn] functions cannot be async"));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "#[julia_fn] functions cannot be generic",
        ));
    }

    let fn_name = &sig.ident;
    let symbol = fn_name.unraw().to_string();
    let julia_name = match &args.name {
        Some(lit) => lit.value(),
        None => {
            if let Some(reason) = julia_name_error(&symbol) {
                return Err(syn::Error::new_spanned(
                    fn_name,
                    format!("{reason}; pick another with #[julia_fn(name = \"...\")]"),
                ));
            }
            symbol.clone()
        }
    };
    let inner_name = format_ident!("__{}_inner", fn_name);
    let trampoline_name = format_ident!("__{}_native", fn_name);

    let vis = &func.vis;
    let block = &func.block;
    let attrs = &func.attrs;

    // Same signature, new name.
    let inner_sig = {
        let mut s = sig.clone();
        s.ident = inner_name.clone();
        s
    };

    // Extract parameter names and types from the function signature.
    let mut param_names = Vec::new();
    let mut param_types = Vec::new();
    for input in &sig.inputs {
        match input {
            FnArg::Typed(pat_type) => match &*pat_type.pat {
                Pat::Ident(pat_ident) => {
                    param_names.push(pat_ident.ident.clone());
                    param_types.push((*pat_type.ty).clone());
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "#[julia_fn] arguments must be plain identifiers",
                    ));
                }
            },
            FnArg::Receiver(recv) => {
                return Err(syn::Error::new_spanned(recv, "#[julia_fn] cannot take `self`"));
            }
        }
    }

    let ret_ty = match &sig.output {
        ReturnType::Default => quote! { () },
        ReturnType::Type(_, ty) => quote! { #ty },
    };

    Ok(quote! {
        #(#attrs)*
        #vis #inner_sig #block

        #[doc(hidden)]
        #[unsafe(export_name = #symbol)]
        pub extern "C" fn #trampoline_name(#(#param_names: #param_types),*) -> #ret_ty {
            #inner_name(#(#param_names),*)
        }

        #[allow(non_camel_case_types)]
        #vis struct #fn_name;

        impl #fn_name {
            /// Descriptor for the native registry.
            pub fn native() -> ::rusty_julia::NativeFunction {
                const ARGS: &[::rusty_julia::NativeKind] = &[
                    #(<#param_types as ::rusty_julia::NativeType>::KIND),*
                ];
                // The trampoline's signature is built from the same types as
                // ARGS and the return kind.
                unsafe {
                    ::rusty_julia::NativeFunction::new(
                        #julia_name,
                        #symbol,
                        #trampoline_name as *const ::std::ffi::c_void,
                        ARGS,
                        <#ret_ty as ::rusty_julia::NativeType>::KIND,
                    )
                }
            }

            pub fn register(rt: &::rusty_julia::Runtime) -> ::rusty_julia::Result<()> {
                rt.register_native(&Self::native())
            }
        }
    })
}
