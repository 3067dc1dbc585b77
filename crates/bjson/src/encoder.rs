//! Compacting encoder: emits one token at a time, leaving worst-case
//! placeholder headers for open containers and rewriting them with the
//! narrowest size class once the container's body length is known.

use crate::format;
use crate::types::Result;
use crate::types::Status;

/// Worst case container header: one tag byte plus a 4-byte length.
const PLACEHOLDER_HEADER_LEN: usize = 5;

/// Picks the narrowest `base | size_class` tag for `magnitude` and
/// returns it alongside the little-endian magnitude bytes (padded to 8,
/// only the first `width` of which are meaningful).
fn narrowest_header(base: u8, magnitude: u64) -> (u8, [u8; 8], usize) {
    if magnitude <= u8::MAX as u64 {
        let mut bytes = [0u8; 8];
        bytes[0] = magnitude as u8;
        (format::make_tag(base, format::size_class::BYTE), bytes, 1)
    } else if magnitude <= u16::MAX as u64 {
        let mut bytes = [0u8; 8];
        bytes[..2].copy_from_slice(&(magnitude as u16).to_le_bytes());
        (format::make_tag(base, format::size_class::WORD), bytes, 2)
    } else if magnitude <= u32::MAX as u64 {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&(magnitude as u32).to_le_bytes());
        (format::make_tag(base, format::size_class::DWORD), bytes, 4)
    } else {
        (
            format::make_tag(base, format::size_class::QWORD),
            magnitude.to_le_bytes(),
            8,
        )
    }
}

struct Frame {
    header_offset: usize,
    is_map: bool,
    /// Only meaningful for map frames: true when the next token emitted
    /// at this level must be a key.
    next_is_key: bool,
}

/// Builds a BJSON document by accepting one token at a time.
///
/// Status is sticky: once any call sets a non-`Ok` status, every later
/// call is a no-op that returns the same status.
pub struct Encoder {
    buf: Vec<u8>,
    stack: Vec<Frame>,
    status: Status,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            stack: Vec::new(),
            status: Status::Ok,
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
            stack: Vec::new(),
            status: Status::Ok,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn get_output(&self) -> &[u8] {
        &self.buf
    }

    /// The encoder's error text never carries offset/token detail, even
    /// in verbose mode; only the decoder's does.
    pub fn format_error_message(&self, _verbose: bool) -> String {
        self.status.as_text().to_string()
    }

    /// Reserved for future use; mirrors the original API surface.
    pub fn clear(&mut self) -> Result<()> {
        self.fail(Status::NotImplemented)
    }

    /// Reserved for future use; mirrors the original API surface.
    pub fn reset(&mut self, _separator: &[u8]) -> Result<()> {
        self.fail(Status::NotImplemented)
    }

    fn fail(&mut self, status: Status) -> Result<()> {
        if self.status.is_ok() {
            self.status = status;
        }
        Err(self.status)
    }

    fn ok(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_key_turn(&self) -> bool {
        match self.stack.last() {
            Some(frame) => frame.is_map && frame.next_is_key,
            None => false,
        }
    }

    fn rotate_turn(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.is_map {
                frame.next_is_key = !frame.next_is_key;
            }
        }
    }

    fn guard_key_turn(&mut self, is_string: bool) -> Result<()> {
        if !self.status.is_ok() {
            return Err(self.status);
        }
        if self.is_key_turn() && !is_string {
            return self.fail(Status::InvalidObjectKey);
        }
        Ok(())
    }

    fn put_byte(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn put_bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    /// Emits `base | size_class` followed by `magnitude` in the
    /// narrowest of {1,2,4,8} little-endian bytes that holds it.
    /// Returns the tag byte written.
    fn emit_sized(&mut self, base: u8, magnitude: u64) -> u8 {
        let (tag, bytes, width) = narrowest_header(base, magnitude);
        self.put_byte(tag);
        self.put_bytes(&bytes[..width]);
        tag
    }

    pub fn emit_null(&mut self) -> Result<()> {
        self.guard_key_turn(false)?;
        self.put_byte(format::NULL);
        self.rotate_turn();
        self.ok()
    }

    pub fn emit_bool(&mut self, v: bool) -> Result<()> {
        self.guard_key_turn(false)?;
        let tag = if v {
            format::STRICT_TRUE
        } else {
            format::STRICT_FALSE
        };
        self.put_byte(tag);
        self.rotate_turn();
        self.ok()
    }

    pub fn emit_integer(&mut self, v: i64) -> Result<()> {
        self.guard_key_turn(false)?;
        let tag = if v == 0 {
            self.put_byte(format::STRICT_INTEGER_ZERO);
            format::STRICT_INTEGER_ZERO
        } else if v == 1 {
            self.put_byte(format::STRICT_INTEGER_ONE);
            format::STRICT_INTEGER_ONE
        } else if v < 0 {
            self.emit_sized(format::NEGATIVE_INTEGER_BASE, v.unsigned_abs())
        } else {
            self.emit_sized(format::POSITIVE_INTEGER_BASE, v as u64)
        };
        self.rotate_turn();
        self.ok()
    }

    pub fn emit_double(&mut self, v: f64) -> Result<()> {
        self.guard_key_turn(false)?;
        self.put_byte(format::FLOAT64);
        self.put_bytes(&v.to_le_bytes());
        self.rotate_turn();
        self.ok()
    }

    pub fn emit_string(&mut self, v: &[u8]) -> Result<()> {
        if !self.status.is_ok() {
            return Err(self.status);
        }
        if v.is_empty() {
            self.put_byte(format::EMPTY_STRING);
        } else {
            self.emit_sized(format::STRING_BASE, v.len() as u64);
            self.put_bytes(v);
        }
        self.rotate_turn();
        self.ok()
    }

    pub fn emit_cstring(&mut self, v: &std::ffi::CStr) -> Result<()> {
        self.emit_string(v.to_bytes())
    }

    pub fn emit_binary(&mut self, v: &[u8]) -> Result<()> {
        self.guard_key_turn(false)?;
        self.emit_sized(format::BINARY_BASE, v.len() as u64);
        self.put_bytes(v);
        self.rotate_turn();
        self.ok()
    }

    fn open_container(&mut self, is_map: bool) -> Result<()> {
        self.guard_key_turn(false)?;
        if self.stack.len() >= format::MAX_DEPTH {
            return self.fail(Status::TooManyNestedContainers);
        }

        // The container-as-value fills the parent's current turn slot
        // the moment we commit to opening it, before its body is known.
        self.rotate_turn();

        let header_offset = self.buf.len();
        self.buf
            .extend(std::iter::repeat(0xFFu8).take(PLACEHOLDER_HEADER_LEN));
        self.stack.push(Frame {
            header_offset,
            is_map,
            next_is_key: false,
        });
        // The freshly opened frame's own turn rotates once so the
        // first child of a map is a key position.
        self.rotate_turn();

        self.ok()
    }

    fn close_container(&mut self, is_map: bool) -> Result<()> {
        if !self.status.is_ok() {
            return Err(self.status);
        }

        let frame = match self.stack.last() {
            Some(frame) => frame,
            None => {
                return self.fail(if is_map {
                    Status::CloseMapAtRootLevel
                } else {
                    Status::CloseArrayAtRootLevel
                });
            }
        };

        if frame.is_map != is_map {
            return self.fail(if is_map {
                Status::CloseMapButArrayOpen
            } else {
                Status::CloseArrayButMapOpen
            });
        }

        let frame = self.stack.pop().expect("checked above");
        let body_len = self.buf.len() - frame.header_offset - PLACEHOLDER_HEADER_LEN;
        let base = if is_map {
            format::MAP_BASE
        } else {
            format::ARRAY_BASE
        };

        let (tag, bytes, width) = narrowest_header(base, body_len as u64);
        let header_len = 1 + width;
        self.buf[frame.header_offset] = tag;
        self.buf[frame.header_offset + 1..frame.header_offset + header_len]
            .copy_from_slice(&bytes[..width]);

        if header_len < PLACEHOLDER_HEADER_LEN {
            let body_start_old = frame.header_offset + PLACEHOLDER_HEADER_LEN;
            let body_start_new = frame.header_offset + header_len;
            self.buf.copy_within(body_start_old.., body_start_new);
            self.buf.truncate(body_start_new + body_len);
        }

        self.ok()
    }

    pub fn open_array(&mut self) -> Result<()> {
        self.open_container(false)
    }

    pub fn close_array(&mut self) -> Result<()> {
        self.close_container(false)
    }

    pub fn open_map(&mut self) -> Result<()> {
        self.open_container(true)
    }

    pub fn close_map(&mut self) -> Result<()> {
        self.close_container(true)
    }
}
