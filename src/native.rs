use std::collections::BTreeMap;
use std::ffi::c_void;
use std::fmt::Write as _;

use crate::error::{Error, Result};

/// Largest number of arguments a registered native function may take.
pub const MAX_NATIVE_ARITY: usize = 16;

/// A C-ABI type that can cross a `ccall` boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    Float64,
    Float32,
    Int64,
    Int32,
    Int16,
    Int8,
    UInt64,
    UInt32,
    UInt16,
    UInt8,
    Bool,
    /// Only valid as a return type.
    Nothing,
}

impl NativeKind {
    /// The Julia type used in a `ccall` signature.
    pub fn julia_name(self) -> &'static str {
        match self {
            NativeKind::Float64 => "Float64",
            NativeKind::Float32 => "Float32",
            NativeKind::Int64 => "Int64",
            NativeKind::Int32 => "Int32",
            NativeKind::Int16 => "Int16",
            NativeKind::Int8 => "Int8",
            NativeKind::UInt64 => "UInt64",
            NativeKind::UInt32 => "UInt32",
            NativeKind::UInt16 => "UInt16",
            NativeKind::UInt8 => "UInt8",
            NativeKind::Bool => "Bool",
            NativeKind::Nothing => "Cvoid",
        }
    }
}

/// Rust types usable in a `#[julia_fn]` signature.
///
/// # Safety
/// `KIND` must name a Julia type with the same C ABI as `Self`.
pub unsafe trait NativeType {
    const KIND: NativeKind;
}

macro_rules! impl_native_type {
    ($($ty:ty => $kind:ident),* $(,)?) => { $(
        unsafe impl NativeType for $ty {
            const KIND: NativeKind = NativeKind::$kind;
        }
    )* };
}

impl_native_type! {
    f64 => Float64,
    f32 => Float32,
    i64 => Int64,
    i32 => Int32,
    i16 => Int16,
    i8 => Int8,
    u64 => UInt64,
    u32 => UInt32,
    u16 => UInt16,
    u8 => UInt8,
    bool => Bool,
    () => Nothing,
}

/// A process-native function callable from Julia, with its signature.
///
/// Usually produced by `#[julia_fn]`:
///
/// ```rust,no_run
/// use rusty_julia::{Runtime, julia_fn};
///
/// #[julia_fn]
/// fn my_c_sqrt(x: f64) -> f64 {
///     x.sqrt()
/// }
///
/// let rt = Runtime::init().unwrap();
/// my_c_sqrt::register(&rt).unwrap();
/// let v: f64 = rt.eval("my_c_sqrt(2.0)").unwrap().unbox().unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeFunction {
    name: &'static str,
    symbol: &'static str,
    ptr: *const c_void,
    args: &'static [NativeKind],
    ret: NativeKind,
}

impl NativeFunction {
    /// # Safety
    /// `ptr` must be an `extern "C"` function whose parameters and return
    /// type have exactly the ABI described by `args` and `ret`, and it must
    /// stay valid for the life of the process.
    pub unsafe fn new(
        name: &'static str,
        symbol: &'static str,
        ptr: *const c_void,
        args: &'static [NativeKind],
        ret: NativeKind,
    ) -> Self {
        NativeFunction {
            name,
            symbol,
            ptr,
            args,
            ret,
        }
    }

    /// Name of the Julia wrapper defined in `Main`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Exported symbol, usable as `ccall(:symbol, ...)`.
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn ptr(&self) -> *const c_void {
        self.ptr
    }

    pub fn args(&self) -> &'static [NativeKind] {
        self.args
    }

    pub fn ret(&self) -> NativeKind {
        self.ret
    }

    /// Julia source defining a typed wrapper method that `ccall`s the
    /// function pointer directly:
    ///
    /// `f(a1::Float64) = ccall(Ptr{Cvoid}(0x...), Float64, (Float64,), a1)`
    pub fn wrapper_source(&self) -> String {
        let width = 2 + 2 * std::mem::size_of::<usize>();
        let params: Vec<String> = (1..=self.args.len()).map(|i| format!("a{i}")).collect();

        let mut src = String::new();
        let _ = write!(src, "{}(", self.name);
        for (i, (p, kind)) in params.iter().zip(self.args).enumerate() {
            if i > 0 {
                src.push_str(", ");
            }
            let _ = write!(src, "{p}::{}", kind.julia_name());
        }
        let _ = write!(
            src,
            ") = ccall(Ptr{{Cvoid}}({:#0width$x}), {}, (",
            self.ptr as usize,
            self.ret.julia_name(),
        );
        for kind in self.args {
            let _ = write!(src, "{},", kind.julia_name());
        }
        src.push(')');
        for p in &params {
            let _ = write!(src, ", {p}");
        }
        src.push(')');
        src
    }
}

const RESERVED: &[&str] = &[
    "baremodule", "begin", "break", "catch", "const", "continue", "do", "else", "elseif", "end",
    "export", "false", "finally", "for", "function", "global", "if", "import", "let", "local",
    "macro", "module", "public", "quote", "return", "struct", "true", "try", "using", "while",
];

/// Whether `name` can be used as a plain Julia identifier.
///
/// ASCII only, unlike Julia, so a name without `!` is also a valid C
/// symbol.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '!') {
        return false;
    }
    !RESERVED.contains(&name)
}

/// Registered native functions, keyed by Julia name.
#[derive(Debug, Default)]
pub struct NativeRegistry {
    entries: BTreeMap<&'static str, NativeFunction>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `f` against the registry without inserting it.
    pub fn validate(&self, f: &NativeFunction) -> Result<()> {
        let reject = |reason: String| Error::NativeRegistration {
            name: f.name.into(),
            reason,
        };

        if !is_valid_identifier(f.name) {
            return Err(reject("not a valid Julia identifier".into()));
        }
        if self.entries.contains_key(f.name) {
            return Err(reject("already registered".into()));
        }
        if f.ptr.is_null() {
            return Err(reject("null function pointer".into()));
        }
        if f.args.len() > MAX_NATIVE_ARITY {
            return Err(reject(format!(
                "{} arguments exceeds the limit of {MAX_NATIVE_ARITY}",
                f.args.len()
            )));
        }
        if let Some(pos) = f.args.iter().position(|k| *k == NativeKind::Nothing) {
            return Err(reject(format!(
                "argument {} has type Cvoid, which is only valid as a return type",
                pos + 1
            )));
        }
        Ok(())
    }

    /// Validate and insert.
    pub fn insert(&mut self, f: NativeFunction) -> Result<()> {
        self.validate(&f)?;
        self.entries.insert(f.name, f);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NativeFunction> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NativeFunction> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
