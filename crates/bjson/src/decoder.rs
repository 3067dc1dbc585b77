//! Push-style streaming decoder. Bytes are pushed via [`Decoder::feed`]
//! in order, arbitrarily fragmented; each fully decoded token reaches
//! the sink synchronously before `feed` returns.

use crate::format;
use crate::traits::TokenSink;
use crate::types::Control;
use crate::types::Result;
use crate::types::Status;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Waiting for the next tag byte.
    Tag,
    /// Waiting for the size/immediate field implied by the last tag.
    LengthOrImmediate,
    /// Waiting for a string/binary body of a known length.
    Body,
}

struct Frame {
    is_map: bool,
    /// Absolute stream index at which this container's body ends.
    end_index: u64,
    next_is_key: bool,
}

/// Decodes a BJSON byte stream, delivering tokens to a [`TokenSink`].
pub struct Decoder<S: TokenSink> {
    sink: S,
    status: Status,
    stage: Stage,
    /// Tag byte read at the start of the token currently in flight.
    pending_tag: u8,
    /// For `LengthOrImmediate`/`Body`: total bytes the field needs.
    field_len: usize,
    stack: Vec<Frame>,
    cache: Vec<u8>,
    cache_needed: usize,
    /// Absolute count of tag/field/body bytes consumed so far, used for
    /// container end-of-body bookkeeping and error messages.
    abs_index: u64,
}

impl<S: TokenSink> Decoder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            status: Status::Ok,
            stage: Stage::Tag,
            pending_tag: 0,
            field_len: 0,
            stack: Vec::new(),
            cache: Vec::new(),
            cache_needed: 0,
            abs_index: 0,
        }
    }

    /// Like [`Decoder::new`], but pre-sizes the fragment cache that
    /// buffers a partial tag/length/body field split across `feed`
    /// calls, for callers who know roughly how large a split field to
    /// expect.
    pub fn with_capacity(sink: S, cache_capacity: usize) -> Self {
        Self {
            cache: Vec::with_capacity(cache_capacity),
            ..Self::new(sink)
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// `"<status-text> near offset <absolute_index> (last token is '<token-name>')"`
    /// in verbose mode, or just the status text otherwise.
    pub fn format_error_message(&self, verbose: bool) -> String {
        if verbose {
            format!(
                "{} near offset {} (last token is '{}')",
                self.status.as_text(),
                self.abs_index,
                format::token_name(self.pending_tag)
            )
        } else {
            self.status.as_text().to_string()
        }
    }

    fn fail(&mut self, status: Status) -> Status {
        if self.status.is_ok() {
            self.status = status;
        }
        self.status
    }

    /// Feed the next chunk of bytes. Chunks may split a token anywhere,
    /// including mid-tag-field or mid-string-body.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.status.is_ok() {
            return Err(self.status);
        }

        let mut input = bytes;

        if !self.cache.is_empty() {
            let need = self.cache_needed - self.cache.len();
            let take = need.min(input.len());
            self.cache.extend_from_slice(&input[..take]);
            input = &input[take..];

            if self.cache.len() < self.cache_needed {
                return Ok(());
            }

            let cached = std::mem::take(&mut self.cache);
            self.cache_needed = 0;
            self.run(&cached)?;
        }

        self.run(input)
    }

    /// Drives the stage machine over `data` until it is exhausted or an
    /// incomplete field forces a cache stash.
    fn run(&mut self, data: &[u8]) -> Result<()> {
        let mut pos = 0usize;

        while pos < data.len() {
            if !self.status.is_ok() {
                return Err(self.status);
            }

            match self.stage {
                Stage::Tag => {
                    let tag = data[pos];
                    pos += 1;
                    self.abs_index += 1;
                    self.pending_tag = tag;

                    if self.on_tag(tag)?.is_abort() {
                        return Err(self.fail(Status::CanceledByClient));
                    }
                }
                Stage::LengthOrImmediate => {
                    let width = format::size_class_width(self.pending_tag);
                    let have = data.len() - pos;
                    if have < width {
                        self.stash(&data[pos..], width);
                        return Ok(());
                    }
                    let field = &data[pos..pos + width];
                    pos += width;
                    self.abs_index += width as u64;
                    if self.on_length_or_immediate(field)?.is_abort() {
                        return Err(self.fail(Status::CanceledByClient));
                    }
                }
                Stage::Body => {
                    let have = data.len() - pos;
                    if have < self.field_len {
                        self.stash(&data[pos..], self.field_len);
                        return Ok(());
                    }
                    let body = &data[pos..pos + self.field_len];
                    pos += self.field_len;
                    self.abs_index += self.field_len as u64;
                    if self.on_body(body)?.is_abort() {
                        return Err(self.fail(Status::CanceledByClient));
                    }
                }
            }
        }

        Ok(())
    }

    fn stash(&mut self, partial: &[u8], total_needed: usize) {
        self.cache.clear();
        self.cache.extend_from_slice(partial);
        self.cache_needed = total_needed;
        self.abs_index += partial.len() as u64;
    }

    fn is_key_turn(&self) -> bool {
        match self.stack.last() {
            Some(frame) => frame.next_is_key,
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

    /// Called once a token has fully completed, at whatever the current
    /// (possibly newly opened) nesting depth is: closes any containers
    /// whose declared end has just been reached, possibly cascading
    /// through several levels, then rotates the key/value turn of
    /// whatever remains on top.
    fn after_token(&mut self) -> Control {
        loop {
            let frame = match self.stack.last() {
                Some(frame) => frame,
                None => break,
            };

            if self.abs_index > frame.end_index {
                self.fail(Status::MoreDataThanDeclared);
                return Control::Continue;
            } else if self.abs_index == frame.end_index {
                let is_map = frame.is_map;
                if is_map && frame.next_is_key {
                    self.fail(Status::KeyWithoutValue);
                    return Control::Continue;
                }

                self.stack.pop();
                let control = if is_map {
                    self.sink.end_map()
                } else {
                    self.sink.end_array()
                };
                if control == Control::Abort {
                    return control;
                }
            } else {
                break;
            }
        }

        self.rotate_turn();
        Control::Continue
    }

    fn on_tag(&mut self, tag: u8) -> Result<Control> {
        let is_string_like =
            format::base_kind(tag) == format::STRING_BASE || tag == format::EMPTY_STRING;
        if self.is_key_turn() && !is_string_like {
            return Err(self.fail(Status::InvalidObjectKey));
        }

        let control = match tag {
            format::NULL => self.dispatch_terminal(|s| s.null()),
            format::ZERO_OR_FALSE => self.dispatch_terminal(|s| s.integer(0)),
            format::ONE_OR_TRUE => self.dispatch_terminal(|s| s.integer(1)),
            format::EMPTY_STRING => self.dispatch_string_or_key(&[]),
            format::STRICT_FALSE => self.dispatch_terminal(|s| s.boolean(false)),
            format::STRICT_TRUE => self.dispatch_terminal(|s| s.boolean(true)),
            format::STRICT_INTEGER_ZERO => self.dispatch_terminal(|s| s.integer(0)),
            format::STRICT_INTEGER_ONE => self.dispatch_terminal(|s| s.integer(1)),
            _ => {
                let base = format::base_kind(tag);
                match base {
                    format::POSITIVE_INTEGER_BASE
                    | format::NEGATIVE_INTEGER_BASE
                    | format::FLOAT_BASE
                    | format::STRING_BASE
                    | format::BINARY_BASE
                    | format::ARRAY_BASE
                    | format::MAP_BASE => {
                        self.field_len = format::size_class_width(tag);
                        self.stage = Stage::LengthOrImmediate;
                        Control::Continue
                    }
                    _ => return Err(self.fail(Status::InvalidDataType)),
                }
            }
        };

        Ok(control)
    }

    fn dispatch_terminal(&mut self, f: impl FnOnce(&mut S) -> Control) -> Control {
        let control = f(&mut self.sink);
        if control == Control::Abort {
            return control;
        }
        self.after_token()
    }

    fn dispatch_string_or_key(&mut self, bytes: &[u8]) -> Control {
        let control = if self.is_key_turn() {
            self.sink.map_key(bytes)
        } else {
            self.sink.string(bytes)
        };
        if control == Control::Abort {
            return control;
        }
        self.after_token()
    }

    fn on_length_or_immediate(&mut self, field: &[u8]) -> Result<Control> {
        let base = format::base_kind(self.pending_tag);
        let mut widened = [0u8; 8];
        widened[..field.len()].copy_from_slice(field);
        let raw = u64::from_le_bytes(widened);

        let control = match base {
            format::POSITIVE_INTEGER_BASE => {
                self.stage = Stage::Tag;
                self.dispatch_terminal(|s| s.integer(raw as i64))
            }
            format::NEGATIVE_INTEGER_BASE => {
                self.stage = Stage::Tag;
                self.dispatch_terminal(|s| s.integer((raw as i64).wrapping_neg()))
            }
            format::FLOAT_BASE => {
                self.stage = Stage::Tag;
                match self.pending_tag {
                    format::FLOAT32 => {
                        let bits = u32::from_le_bytes(field.try_into().unwrap());
                        let value = f32::from_bits(bits) as f64;
                        self.dispatch_terminal(|s| s.double(value))
                    }
                    format::FLOAT64 => {
                        let bits = u64::from_le_bytes(field.try_into().unwrap());
                        let value = f64::from_bits(bits);
                        self.dispatch_terminal(|s| s.double(value))
                    }
                    // Obsolete float tags are accepted and their bytes
                    // consumed, but never forwarded to the sink, matching
                    // the reference decoder's dispatch table.
                    _ => Control::Continue,
                }
            }
            format::STRING_BASE | format::BINARY_BASE => {
                self.field_len = raw as usize;
                self.stage = Stage::Body;
                Control::Continue
            }
            format::ARRAY_BASE | format::MAP_BASE => {
                let is_map = base == format::MAP_BASE;
                if self.stack.len() >= format::MAX_DEPTH {
                    return Err(self.fail(Status::TooManyNestedContainers));
                }
                let end_index = self.abs_index + raw;
                self.stack.push(Frame {
                    is_map,
                    end_index,
                    next_is_key: false,
                });
                self.stage = Stage::Tag;
                let control = if is_map {
                    self.sink.start_map()
                } else {
                    self.sink.start_array()
                };
                if control == Control::Abort {
                    control
                } else {
                    self.after_token()
                }
            }
            _ => unreachable!("on_tag only enters LengthOrImmediate for these bases"),
        };

        Ok(control)
    }

    fn on_body(&mut self, body: &[u8]) -> Result<Control> {
        self.stage = Stage::Tag;
        let base = format::base_kind(self.pending_tag);
        let control = if base == format::STRING_BASE {
            self.dispatch_string_or_key(body)
        } else {
            self.dispatch_terminal(|s| s.binary(body))
        };
        Ok(control)
    }

    /// Validates that the stream ended on a clean token boundary at
    /// depth zero. Checks, in order: empty input, mid-token/fragment,
    /// then unclosed containers.
    pub fn finish(&mut self) -> Result<()> {
        if !self.status.is_ok() {
            return Err(self.status);
        }

        if self.abs_index == 0 {
            return Err(self.fail(Status::EmptyInputPassed));
        }

        if self.stage != Stage::Tag || self.cache_needed > 0 {
            return Err(self.fail(Status::UnexpectedEndOfStream));
        }

        if let Some(frame) = self.stack.last() {
            let status = if frame.is_map {
                Status::UnclosedMap
            } else {
                Status::UnclosedArray
            };
            return Err(self.fail(status));
        }

        Ok(())
    }
}

trait ControlExt {
    fn is_abort(self) -> bool;
}

impl ControlExt for Control {
    fn is_abort(self) -> bool {
        matches!(self, Control::Abort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TokenSink for Recorder {
        fn null(&mut self) -> Control {
            self.events.push("null".into());
            Control::Continue
        }
        fn boolean(&mut self, v: bool) -> Control {
            self.events.push(format!("bool({v})"));
            Control::Continue
        }
        fn integer(&mut self, v: i64) -> Control {
            self.events.push(format!("int({v})"));
            Control::Continue
        }
        fn double(&mut self, v: f64) -> Control {
            self.events.push(format!("double({v})"));
            Control::Continue
        }
        fn string(&mut self, v: &[u8]) -> Control {
            self.events
                .push(format!("string({:?})", std::str::from_utf8(v).unwrap()));
            Control::Continue
        }
        fn map_key(&mut self, v: &[u8]) -> Control {
            self.events
                .push(format!("key({:?})", std::str::from_utf8(v).unwrap()));
            Control::Continue
        }
        fn binary(&mut self, v: &[u8]) -> Control {
            self.events.push(format!("binary({} bytes)", v.len()));
            Control::Continue
        }
        fn start_map(&mut self) -> Control {
            self.events.push("start_map".into());
            Control::Continue
        }
        fn end_map(&mut self) -> Control {
            self.events.push("end_map".into());
            Control::Continue
        }
        fn start_array(&mut self) -> Control {
            self.events.push("start_array".into());
            Control::Continue
        }
        fn end_array(&mut self) -> Control {
            self.events.push("end_array".into());
            Control::Continue
        }
    }

    #[test]
    fn single_byte_empty_string() {
        let mut dec = Decoder::new(Recorder::default());
        dec.feed(&[format::EMPTY_STRING]).unwrap();
        dec.finish().unwrap();
        assert_eq!(dec.sink().events, vec!["string(\"\")".to_string()]);
    }

    #[test]
    fn empty_input_is_rejected() {
        let mut dec = Decoder::new(Recorder::default());
        assert_eq!(dec.finish().unwrap_err(), Status::EmptyInputPassed);
    }

    #[test]
    fn fragmentation_is_invisible_to_the_sink() {
        // map8, body-len 6: {"k":"v"}, one byte at a time
        let bytes = [
            format::make_tag(format::MAP_BASE, format::size_class::BYTE),
            0x06,
            format::make_tag(format::STRING_BASE, format::size_class::BYTE),
            0x01,
            b'k',
            format::make_tag(format::STRING_BASE, format::size_class::BYTE),
            0x01,
            b'v',
        ];

        let mut dec = Decoder::new(Recorder::default());
        for byte in bytes.iter() {
            dec.feed(std::slice::from_ref(byte)).unwrap();
        }
        dec.finish().unwrap();

        assert_eq!(
            dec.sink().events,
            vec![
                "start_map".to_string(),
                "key(\"k\")".to_string(),
                "string(\"v\")".to_string(),
                "end_map".to_string(),
            ]
        );
    }

    #[test]
    fn key_without_value_is_detected() {
        // map8, body-len 3: single key "k" with no value
        let bytes = [
            format::make_tag(format::MAP_BASE, format::size_class::BYTE),
            0x03,
            format::make_tag(format::STRING_BASE, format::size_class::BYTE),
            0x01,
            b'k',
        ];

        let mut dec = Decoder::new(Recorder::default());
        assert_eq!(dec.feed(&bytes).unwrap_err(), Status::KeyWithoutValue);
    }

    #[test]
    fn overrunning_a_declared_length_is_rejected() {
        // array8, body-len 1, but the sole element is a 2-byte integer8
        let bytes = [
            format::make_tag(format::ARRAY_BASE, format::size_class::BYTE),
            0x01,
            format::make_tag(format::POSITIVE_INTEGER_BASE, format::size_class::BYTE),
            0x05,
        ];

        let mut dec = Decoder::new(Recorder::default());
        assert_eq!(
            dec.feed(&bytes).unwrap_err(),
            Status::MoreDataThanDeclared
        );
    }

    #[test]
    fn zero_and_one_tags_decode_as_integers() {
        let mut dec = Decoder::new(Recorder::default());
        dec.feed(&[format::ZERO_OR_FALSE, format::ONE_OR_TRUE])
            .unwrap();
        assert_eq!(
            dec.sink().events,
            vec!["int(0)".to_string(), "int(1)".to_string()]
        );
    }

    #[test]
    fn sticky_error_rejects_further_feeds() {
        let mut dec = Decoder::new(Recorder::default());
        assert!(dec.feed(&[0xFFu8]).is_err());
        let first = dec.status();
        assert_eq!(dec.feed(&[format::NULL]).unwrap_err(), first);
    }

    #[test]
    fn obsolete_float_tags_are_consumed_silently() {
        let bytes = [format::FLOAT32_OBSOLETE, 0x00, format::NULL];
        let mut dec = Decoder::new(Recorder::default());
        dec.feed(&bytes).unwrap();
        dec.finish().unwrap();
        assert_eq!(dec.sink().events, vec!["null".to_string()]);
    }
}
