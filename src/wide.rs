//! Wide string marshaling.
//!
//! The native library speaks `wchar_t` strings: UTF-16 code units on
//! Windows, UTF-32 code points everywhere else. Outbound strings are encoded
//! into an owned, NUL-terminated buffer that lives for the duration of the
//! call; inbound strings are copied out immediately, since the library only
//! guarantees its returned buffer until the next call on the same handle.

use libc::wchar_t;

/// Owned, NUL-terminated wide string.
pub(crate) struct WideCString {
    buffer: Vec<wchar_t>,
}

impl WideCString {
    /// Encode `value` for the native side.
    ///
    /// The native side stops reading at the first NUL, so any text after an
    /// embedded `'\0'` is dropped here rather than sent and ignored.
    pub(crate) fn new(value: &str) -> Self {
        let value = value.split('\0').next().unwrap_or_default();
        let mut buffer = encode(value);
        buffer.push(0);
        Self { buffer }
    }

    pub(crate) fn as_ptr(&self) -> *const wchar_t {
        self.buffer.as_ptr()
    }
}

/// Copy a NUL-terminated wide string into an owned `String`.
///
/// A null pointer yields an empty string. Invalid code units are replaced
/// with U+FFFD.
///
/// # Safety
///
/// `pointer` must be null or point to a readable, NUL-terminated `wchar_t`
/// sequence.
pub(crate) unsafe fn from_ptr(pointer: *const wchar_t) -> String {
    if pointer.is_null() {
        return String::new();
    }

    let mut length = 0;
    // SAFETY: the caller guarantees NUL termination, so every offset up to
    // and including the terminator is readable.
    while unsafe { *pointer.add(length) } != 0 {
        length += 1;
    }

    // SAFETY: `length` units were just read one by one.
    let units = unsafe { std::slice::from_raw_parts(pointer, length) };
    decode(units)
}

#[cfg(windows)]
fn encode(value: &str) -> Vec<wchar_t> {
    value.encode_utf16().map(|unit| unit as wchar_t).collect()
}

#[cfg(not(windows))]
fn encode(value: &str) -> Vec<wchar_t> {
    value.chars().map(|character| character as u32 as wchar_t).collect()
}

#[cfg(windows)]
fn decode(units: &[wchar_t]) -> String {
    let units: Vec<u16> = units.iter().map(|&unit| unit as u16).collect();
    String::from_utf16_lossy(&units)
}

#[cfg(not(windows))]
fn decode(units: &[wchar_t]) -> String {
    units
        .iter()
        .map(|&unit| char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
