//! OpenDDL value representation.
//!
//! Literal data, property annotations and references as they appear once a
//! token has been decoded. Sequences keep source order; nothing here is ever
//! re-sorted or de-duplicated.

use std::fmt;

/// The fixed primitive data type vocabulary of OpenDDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Half,
    Float,
    Double,
    String,
    Ref,
}

impl ValueType {
    /// Every primitive type, in keyword table order.
    pub const ALL: [ValueType; 14] = [
        ValueType::Bool,
        ValueType::Int8,
        ValueType::Int16,
        ValueType::Int32,
        ValueType::Int64,
        ValueType::UInt8,
        ValueType::UInt16,
        ValueType::UInt32,
        ValueType::UInt64,
        ValueType::Half,
        ValueType::Float,
        ValueType::Double,
        ValueType::String,
        ValueType::Ref,
    ];

    /// The keyword that declares this type in a structure body.
    pub fn token(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int8 => "int8",
            ValueType::Int16 => "int16",
            ValueType::Int32 => "int32",
            ValueType::Int64 => "int64",
            ValueType::UInt8 => "unsigned_int8",
            ValueType::UInt16 => "unsigned_int16",
            ValueType::UInt32 => "unsigned_int32",
            ValueType::UInt64 => "unsigned_int64",
            ValueType::Half => "half",
            ValueType::Float => "float",
            ValueType::Double => "double",
            ValueType::String => "string",
            ValueType::Ref => "ref",
        }
    }

    /// Look up a type by its exact keyword.
    pub fn from_token(token: &str) -> Option<ValueType> {
        ValueType::ALL.into_iter().find(|t| t.token() == token)
    }

    /// Returns `true` for the four signed integer widths.
    pub fn is_signed_integer(self) -> bool {
        matches!(
            self,
            ValueType::Int8 | ValueType::Int16 | ValueType::Int32 | ValueType::Int64
        )
    }

    /// Returns `true` for the four unsigned integer widths.
    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            ValueType::UInt8 | ValueType::UInt16 | ValueType::UInt32 | ValueType::UInt64
        )
    }

    /// Returns `true` for half, float and double.
    pub fn is_floating(self) -> bool {
        matches!(self, ValueType::Half | ValueType::Float | ValueType::Double)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// An identifier token: structure types, property keys and name bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(text: impl Into<String>) -> Self {
        Identifier(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Byte length of the token text.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visibility of a name: `$global` or `%local`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameScope {
    Global,
    Local,
}

impl NameScope {
    /// The prefix character that introduces a name of this scope.
    pub fn prefix(self) -> char {
        match self {
            NameScope::Global => '$',
            NameScope::Local => '%',
        }
    }
}

/// A scoped name labelling a structure or appearing in a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub scope: NameScope,
    pub id: Identifier,
}

impl Name {
    pub fn new(scope: NameScope, id: Identifier) -> Self {
        Self { scope, id }
    }

    /// The name text without its scope prefix.
    pub fn as_str(&self) -> &str {
        self.id.as_str()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.scope.prefix(), self.id)
    }
}

/// An unresolved, ordered list of referenced names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    pub names: Vec<Name>,
}

impl Reference {
    pub fn new(names: Vec<Name>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref {{")?;
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", name)?;
        }
        write!(f, "}}")
    }
}

/// A decoded literal.
///
/// Half values are kept as their IEEE 754 binary16 bit pattern; use
/// [`Value::as_f32`] to widen them. Strings keep the exact bytes found
/// between the quotes.
#[derive(Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Half(u16),
    Float(f32),
    Double(f64),
    String(Vec<u8>),
    Ref(Reference),
}

impl Value {
    /// The primitive type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::Int8(_) => ValueType::Int8,
            Value::Int16(_) => ValueType::Int16,
            Value::Int32(_) => ValueType::Int32,
            Value::Int64(_) => ValueType::Int64,
            Value::UInt8(_) => ValueType::UInt8,
            Value::UInt16(_) => ValueType::UInt16,
            Value::UInt32(_) => ValueType::UInt32,
            Value::UInt64(_) => ValueType::UInt64,
            Value::Half(_) => ValueType::Half,
            Value::Float(_) => ValueType::Float,
            Value::Double(_) => ValueType::Double,
            Value::String(_) => ValueType::String,
            Value::Ref(_) => ValueType::Ref,
        }
    }

    /// Returns the boolean value if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns any integer variant widened to `i64`.
    ///
    /// `UInt64` values above `i64::MAX` do not fit and yield `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int8(n) => Some(n.into()),
            Value::Int16(n) => Some(n.into()),
            Value::Int32(n) => Some(n.into()),
            Value::Int64(n) => Some(n),
            Value::UInt8(n) => Some(n.into()),
            Value::UInt16(n) => Some(n.into()),
            Value::UInt32(n) => Some(n.into()),
            Value::UInt64(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    /// Returns half and float values as `f32`.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::Half(bits) => Some(half_bits_to_f32(bits)),
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Returns any floating variant widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Double(d) => Some(d),
            _ => self.as_f32().map(f64::from),
        }
    }

    /// Returns the raw string bytes if this is a `String`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the string if this is a `String` holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Returns the reference if this is a `Ref`.
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.value_type(), self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int8(n) => write!(f, "{}", n),
            Value::Int16(n) => write!(f, "{}", n),
            Value::Int32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}", n),
            Value::UInt8(n) => write!(f, "{}", n),
            Value::UInt16(n) => write!(f, "{}", n),
            Value::UInt32(n) => write!(f, "{}", n),
            Value::UInt64(n) => write!(f, "{}", n),
            // Debug keeps the trailing ".0" on whole numbers.
            Value::Half(bits) => write!(f, "{:?}", half_bits_to_f32(*bits)),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Double(x) => write!(f, "{:?}", x),
            Value::String(s) => write!(f, "{:?}", String::from_utf8_lossy(s)),
            Value::Ref(r) => write!(f, "{}", r),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.as_bytes().to_vec())
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Ref(r)
    }
}

// ============================================================================
// Properties and payloads
// ============================================================================

/// The right-hand side of a property: literal data or a reference.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Data(Value),
    Reference(Reference),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Data(v) => write!(f, "{}", v),
            PropertyValue::Reference(r) => write!(f, "{}", r),
        }
    }
}

/// A `key = value` annotation on a structure or on the document context.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: Identifier,
    pub value: PropertyValue,
}

impl Property {
    pub fn new(key: Identifier, value: PropertyValue) -> Self {
        Self { key, value }
    }

    /// Returns the literal if this property holds data.
    pub fn data(&self) -> Option<&Value> {
        match &self.value {
            PropertyValue::Data(v) => Some(v),
            PropertyValue::Reference(_) => None,
        }
    }

    /// Returns the reference if this property holds one.
    pub fn reference(&self) -> Option<&Reference> {
        match &self.value {
            PropertyValue::Reference(r) => Some(r),
            PropertyValue::Data(_) => None,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}

/// The typed literal payload of a structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A flat list, declared without an array width or with width 1.
    List {
        value_type: ValueType,
        values: Vec<Value>,
    },
    /// A list of tuples, declared with an array width above 1.
    ///
    /// Entry lengths are kept as written and may differ from `width`.
    Array {
        value_type: ValueType,
        width: usize,
        entries: Vec<Vec<Value>>,
    },
}

impl Payload {
    pub fn value_type(&self) -> ValueType {
        match self {
            Payload::List { value_type, .. } | Payload::Array { value_type, .. } => *value_type,
        }
    }

    /// Returns the values if this is a flat list.
    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Payload::List { values, .. } => Some(values),
            Payload::Array { .. } => None,
        }
    }

    /// Returns the tuples if this is an array list.
    pub fn entries(&self) -> Option<&[Vec<Value>]> {
        match self {
            Payload::Array { entries, .. } => Some(entries),
            Payload::List { .. } => None,
        }
    }
}

// ============================================================================
// Half precision
// ============================================================================

/// Convert an `f32` to IEEE 754 binary16 bits, rounding to nearest even.
///
/// Values past the half range become infinity and values below its
/// smallest subnormal become zero.
pub fn f32_to_half_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xff) as i32;
    let mant = bits & 0x007f_ffff;

    if exp == 0xff {
        let nan = if mant != 0 { 0x0200 } else { 0 };
        return sign | 0x7c00 | nan;
    }

    let e = exp - 127 + 15;
    if e >= 0x1f {
        return sign | 0x7c00;
    }
    if e <= 0 {
        if e < -10 {
            return sign;
        }
        let m = mant | 0x0080_0000;
        let shift = (14 - e) as u32;
        return sign | ((m >> shift) + round_up(m, shift)) as u16;
    }
    // A carry out of the mantissa bumps the exponent, up to infinity.
    let half = ((e as u32) << 10) | (mant >> 13);
    sign | (half + round_up(mant, 13)) as u16
}

/// 1 when dropping the low `shift` bits of `m` must round the rest up.
fn round_up(m: u32, shift: u32) -> u32 {
    let halfway = 1 << (shift - 1);
    let dropped = m & ((1 << shift) - 1);
    let odd = (m >> shift) & 1;
    u32::from(dropped > halfway || (dropped == halfway && odd == 1))
}

/// Widen IEEE 754 binary16 bits to an `f32`.
pub fn half_bits_to_f32(bits: u16) -> f32 {
    let sign = if bits & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exp = i32::from((bits >> 10) & 0x1f);
    let mant = f32::from(bits & 0x03ff);
    match exp {
        0 => sign * mant * 2f32.powi(-24),
        0x1f if mant == 0.0 => sign * f32::INFINITY,
        0x1f => f32::NAN,
        _ => sign * (1.0 + mant / 1024.0) * 2f32.powi(exp - 15),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_tokens() {
        for t in ValueType::ALL {
            assert_eq!(ValueType::from_token(t.token()), Some(t));
        }
        assert_eq!(ValueType::from_token("unsigned_int16"), Some(ValueType::UInt16));
        assert_eq!(ValueType::from_token("Float"), None);
        assert_eq!(ValueType::from_token("int"), None);
    }

    #[test]
    fn test_half_bits() {
        assert_eq!(f32_to_half_bits(1.0), 0x3c00);
        assert_eq!(f32_to_half_bits(-2.0), 0xc000);
        assert_eq!(f32_to_half_bits(0.5), 0x3800);
        assert_eq!(f32_to_half_bits(1.0e6), 0x7c00);
        assert_eq!(f32_to_half_bits(0.7), 0x399a);
        assert_eq!(f32_to_half_bits(1.0 + 2f32.powi(-11)), 0x3c00);
        assert_eq!(f32_to_half_bits(1.0 + 3.0 * 2f32.powi(-11)), 0x3c02);
        assert_eq!(f32_to_half_bits(65504.0), 0x7bff);
        assert_eq!(f32_to_half_bits(65520.0), 0x7c00);
        assert_eq!(f32_to_half_bits(2f32.powi(-24)), 0x0001);
        assert_eq!(f32_to_half_bits(1.5 * 2f32.powi(-25)), 0x0001);
        assert_eq!(f32_to_half_bits(2f32.powi(-25)), 0x0000);
        assert_eq!(half_bits_to_f32(0x3c00), 1.0);
        assert_eq!(half_bits_to_f32(0x3555), 0.333_251_95);
        assert!(half_bits_to_f32(0x7e00).is_nan());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Int8(-3).as_i64(), Some(-3));
        assert_eq!(Value::UInt64(u64::MAX).as_i64(), None);
        assert_eq!(Value::Half(0x3c00).as_f64(), Some(1.0));
        assert_eq!(Value::from("abc").as_str(), Some("abc"));
        assert_eq!(Value::Bool(true).as_i64(), None);
    }

    #[test]
    fn test_display() {
        let r = Reference::new(vec![
            Name::new(NameScope::Global, Identifier::new("a")),
            Name::new(NameScope::Local, Identifier::new("b")),
        ]);
        assert_eq!(Value::Ref(r).to_string(), "ref {$a, %b}");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
        assert_eq!(Value::from("x y").to_string(), "\"x y\"");
        assert_eq!(format!("{:?}", Value::Int16(7)), "int16(7)");
    }
}
