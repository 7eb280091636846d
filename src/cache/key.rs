//! Cache Key Module
//!
//! Derives deterministic cache keys from a call's positional and named
//! arguments. Positional arguments form an ordered sequence; named arguments
//! are held in a sorted map so the order they were supplied in is irrelevant.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::InvalidKeyError;

// == Key Part ==
/// A single hashable argument value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Unit,
    Bool(bool),
    /// Any integer representable as i64, whatever its source width
    Int(i64),
    /// Unsigned integers above i64::MAX
    UInt(u64),
    /// IEEE-754 bits of a non-NaN float, with -0.0 folded into 0.0
    Float(u64),
    Str(String),
    Tuple(Vec<KeyPart>),
}

impl KeyPart {
    fn from_f64(value: f64) -> Result<Self, InvalidKeyError> {
        if value.is_nan() {
            return Err(InvalidKeyError::new("NaN cannot be used as a cache key"));
        }
        let value = if value == 0.0 { 0.0 } else { value };
        Ok(KeyPart::Float(value.to_bits()))
    }

    fn from_u64(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => KeyPart::Int(v),
            Err(_) => KeyPart::UInt(value),
        }
    }
}

// == Key Arg ==
/// A value that can take part in a cache key.
pub trait KeyArg {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError>;
}

impl KeyArg for KeyPart {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(self.clone())
    }
}

impl KeyArg for str {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(KeyPart::Str(self.to_string()))
    }
}

impl KeyArg for String {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(KeyPart::Str(self.clone()))
    }
}

impl KeyArg for char {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(KeyPart::Str(self.to_string()))
    }
}

impl KeyArg for bool {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(KeyPart::Bool(*self))
    }
}

impl KeyArg for () {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(KeyPart::Unit)
    }
}

macro_rules! impl_key_arg_signed {
    ($($ty:ty),+) => {
        $(impl KeyArg for $ty {
            fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
                Ok(KeyPart::Int(i64::from(*self)))
            }
        })+
    };
}

macro_rules! impl_key_arg_unsigned {
    ($($ty:ty),+) => {
        $(impl KeyArg for $ty {
            fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
                Ok(KeyPart::from_u64(u64::from(*self)))
            }
        })+
    };
}

impl_key_arg_signed!(i8, i16, i32, i64);
impl_key_arg_unsigned!(u8, u16, u32, u64);

impl KeyArg for isize {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(KeyPart::Int(*self as i64))
    }
}

impl KeyArg for usize {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(KeyPart::from_u64(*self as u64))
    }
}

impl KeyArg for f64 {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        KeyPart::from_f64(*self)
    }
}

impl KeyArg for f32 {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        KeyPart::from_f64(f64::from(*self))
    }
}

impl<T: KeyArg> KeyArg for Option<T> {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        match self {
            Some(value) => value.key_part(),
            None => Ok(KeyPart::Unit),
        }
    }
}

impl<T: KeyArg + ?Sized> KeyArg for &T {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        (**self).key_part()
    }
}

impl<T: KeyArg + ?Sized> KeyArg for Arc<T> {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        (**self).key_part()
    }
}

impl<T: KeyArg> KeyArg for [T] {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        self.iter()
            .map(KeyArg::key_part)
            .collect::<Result<Vec<_>, _>>()
            .map(KeyPart::Tuple)
    }
}

impl<T: KeyArg> KeyArg for Vec<T> {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        self.as_slice().key_part()
    }
}

impl<A: KeyArg, B: KeyArg> KeyArg for (A, B) {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(KeyPart::Tuple(vec![self.0.key_part()?, self.1.key_part()?]))
    }
}

impl<A: KeyArg, B: KeyArg, C: KeyArg> KeyArg for (A, B, C) {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        Ok(KeyPart::Tuple(vec![
            self.0.key_part()?,
            self.1.key_part()?,
            self.2.key_part()?,
        ]))
    }
}

/// JSON scalars are keyable; arrays and objects are mutable containers and are
/// rejected.
impl KeyArg for serde_json::Value {
    fn key_part(&self) -> Result<KeyPart, InvalidKeyError> {
        use serde_json::Value;

        match self {
            Value::Null => Ok(KeyPart::Unit),
            Value::Bool(b) => Ok(KeyPart::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(KeyPart::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(KeyPart::from_u64(u))
                } else {
                    n.as_f64()
                        .ok_or_else(|| InvalidKeyError::new(format!("unrepresentable number {n}")))
                        .and_then(KeyPart::from_f64)
                }
            }
            Value::String(s) => Ok(KeyPart::Str(s.clone())),
            Value::Array(_) => Err(InvalidKeyError::new("JSON array is not hashable")),
            Value::Object(_) => Err(InvalidKeyError::new("JSON object is not hashable")),
        }
    }
}

// == Cache Key ==
/// Composite key of a call's positional and named arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CacheKey {
    positional: Vec<KeyPart>,
    named: BTreeMap<String, KeyPart>,
}

impl CacheKey {
    pub fn positional(&self) -> &[KeyPart] {
        &self.positional
    }

    pub fn named(&self) -> &BTreeMap<String, KeyPart> {
        &self.named
    }
}

// == Call Args ==
/// Builder collecting a call's arguments into a [`CacheKey`].
///
/// The first conversion failure is kept and reported by [`CallArgs::build`].
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    key: CacheKey,
    error: Option<InvalidKeyError>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl KeyArg) -> Self {
        if self.error.is_none() {
            match value.key_part() {
                Ok(part) => self.key.positional.push(part),
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    /// Adds a named argument. Supplying the same name twice is an error.
    pub fn named(mut self, name: impl Into<String>, value: impl KeyArg) -> Self {
        if self.error.is_some() {
            return self;
        }
        let name = name.into();
        if self.key.named.contains_key(&name) {
            self.error = Some(InvalidKeyError::new(format!(
                "duplicate named argument '{name}'"
            )));
            return self;
        }
        match value.key_part() {
            Ok(part) => {
                self.key.named.insert(name, part);
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    pub fn build(self) -> Result<CacheKey, InvalidKeyError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.key),
        }
    }
}

// == Cache Args ==
/// Argument bundles that can be reduced to a [`CacheKey`].
pub trait CacheArgs {
    fn cache_key(&self) -> Result<CacheKey, InvalidKeyError>;
}

impl CacheArgs for CallArgs {
    fn cache_key(&self) -> Result<CacheKey, InvalidKeyError> {
        self.clone().build()
    }
}

impl CacheArgs for () {
    fn cache_key(&self) -> Result<CacheKey, InvalidKeyError> {
        Ok(CacheKey::default())
    }
}

macro_rules! impl_cache_args_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: KeyArg),+> CacheArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn cache_key(&self) -> Result<CacheKey, InvalidKeyError> {
                let ($($name,)+) = self;
                Ok(CacheKey {
                    positional: vec![$($name.key_part()?),+],
                    named: BTreeMap::new(),
                })
            }
        }
    };
}

impl_cache_args_for_tuple!(A);
impl_cache_args_for_tuple!(A, B);
impl_cache_args_for_tuple!(A, B, C);
impl_cache_args_for_tuple!(A, B, C, D);
