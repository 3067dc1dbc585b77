//! Wire constants: data type tags, size classes, and the status/token
//! name tables used for error reporting.

/// Size-class postfixes combined with a `*_BASE` value to build a
/// concrete tag: `BASE | SIZE_CLASS`.
pub mod size_class {
    pub const BYTE: u8 = 0;
    pub const WORD: u8 = 1;
    pub const DWORD: u8 = 2;
    pub const QWORD: u8 = 3;
}

pub const NULL: u8 = 0;
pub const ZERO_OR_FALSE: u8 = 1;
pub const EMPTY_STRING: u8 = 2;
pub const ONE_OR_TRUE: u8 = 3;

pub const POSITIVE_INTEGER_BASE: u8 = 4;
pub const POSITIVE_INTEGER8: u8 = 4;
pub const POSITIVE_INTEGER16: u8 = 5;
pub const POSITIVE_INTEGER32: u8 = 6;
pub const POSITIVE_INTEGER64: u8 = 7;

pub const NEGATIVE_INTEGER_BASE: u8 = 8;
pub const NEGATIVE_INTEGER8: u8 = 8;
pub const NEGATIVE_INTEGER16: u8 = 9;
pub const NEGATIVE_INTEGER32: u8 = 10;
pub const NEGATIVE_INTEGER64: u8 = 11;

pub const FLOAT_BASE: u8 = 12;
pub const FLOAT32_OBSOLETE: u8 = 12;
pub const FLOAT64_OBSOLETE: u8 = 13;
pub const FLOAT32: u8 = 14;
pub const FLOAT64: u8 = 15;

pub const STRING_BASE: u8 = 16;
pub const STRING8: u8 = 16;
pub const STRING16: u8 = 17;
pub const STRING32: u8 = 18;
pub const STRING64: u8 = 19;

pub const BINARY_BASE: u8 = 20;
pub const BINARY8: u8 = 20;
pub const BINARY16: u8 = 21;
pub const BINARY32: u8 = 22;
pub const BINARY64: u8 = 23;

pub const STRICT_FALSE: u8 = 24;
pub const STRICT_TRUE: u8 = 25;
pub const STRICT_INTEGER_ZERO: u8 = 26;
pub const STRICT_INTEGER_ONE: u8 = 27;

pub const ARRAY_BASE: u8 = 32;
pub const ARRAY8: u8 = 32;
pub const ARRAY16: u8 = 33;
pub const ARRAY32: u8 = 34;
pub const ARRAY64: u8 = 35;

pub const MAP_BASE: u8 = 36;
pub const MAP8: u8 = 36;
pub const MAP16: u8 = 37;
pub const MAP32: u8 = 38;
pub const MAP64: u8 = 39;

/// Maximum nesting depth for arrays and maps, mirroring the reference
/// implementation's fixed container stack.
pub const MAX_DEPTH: usize = 1024;

pub const VERSION_MAJOR: u32 = 1;
pub const VERSION_MINOR: u32 = 1;
pub const VERSION_MICRO: u32 = 0;

/// Packed version number, matching `BJSON_VERSION`'s
/// `major * 10000 + minor * 100 + micro` layout.
pub const fn version() -> u32 {
    (VERSION_MAJOR * 10_000) + (VERSION_MINOR * 100) + VERSION_MICRO
}

/// `"major.minor.micro"`, matching `bjson_getVersionAsText`.
pub fn version_as_text() -> String {
    format!("{VERSION_MAJOR}.{VERSION_MINOR}.{VERSION_MICRO}")
}

/// `base | size_class`, the low two bits selecting a 1/2/4/8 byte field.
pub const fn make_tag(base: u8, size: u8) -> u8 {
    base | size
}

/// Byte width implied by a tag's low two bits: `1 << (tag & 0x3)`.
pub const fn size_class_width(tag: u8) -> usize {
    1usize << (tag & 0x3)
}

/// The upper bits of a tag, i.e. the tag with its size class masked off.
pub const fn base_kind(tag: u8) -> u8 {
    tag & !0x3
}

/// Human-readable name for a tag value, matching `bjson_getTokenName`.
pub fn token_name(tag: u8) -> &'static str {
    match tag {
        NULL => "null",
        ZERO_OR_FALSE => "zero_or_false",
        EMPTY_STRING => "empty_string",
        ONE_OR_TRUE => "one_or_true",
        POSITIVE_INTEGER8 => "positive_integer8",
        POSITIVE_INTEGER16 => "positive_integer16",
        POSITIVE_INTEGER32 => "positive_integer32",
        POSITIVE_INTEGER64 => "positive_integer64",
        NEGATIVE_INTEGER8 => "negative_integer8",
        NEGATIVE_INTEGER16 => "negative_integer16",
        NEGATIVE_INTEGER32 => "negative_integer32",
        NEGATIVE_INTEGER64 => "negative_integer64",
        FLOAT32_OBSOLETE => "obsolete_float32",
        FLOAT64_OBSOLETE => "obsolete_float64",
        FLOAT32 => "float32",
        FLOAT64 => "float64",
        STRING8 => "string8",
        STRING16 => "string16",
        STRING32 => "string32",
        STRING64 => "string64",
        BINARY8 => "binary8",
        BINARY16 => "binary16",
        BINARY32 => "binary32",
        BINARY64 => "binary64",
        ARRAY8 => "array8",
        ARRAY16 => "array16",
        ARRAY32 => "array32",
        ARRAY64 => "array64",
        MAP8 => "map8",
        MAP16 => "map16",
        MAP32 => "map32",
        MAP64 => "map64",
        STRICT_FALSE => "strict_false",
        STRICT_TRUE => "strict_true",
        STRICT_INTEGER_ZERO => "strict_integer_zero",
        STRICT_INTEGER_ONE => "strict_integer_one",
        _ => "unknown",
    }
}
