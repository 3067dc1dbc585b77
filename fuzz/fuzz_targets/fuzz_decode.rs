#![no_main]
use libfuzzer_sys::fuzz_target;

use bjson::{Control, Decoder, TokenSink};

#[derive(Default)]
struct Discard;

impl TokenSink for Discard {
    fn null(&mut self) -> Control {
        Control::Continue
    }
    fn boolean(&mut self, _v: bool) -> Control {
        Control::Continue
    }
    fn integer(&mut self, _v: i64) -> Control {
        Control::Continue
    }
    fn double(&mut self, _v: f64) -> Control {
        Control::Continue
    }
    fn string(&mut self, _v: &[u8]) -> Control {
        Control::Continue
    }
    fn map_key(&mut self, _v: &[u8]) -> Control {
        Control::Continue
    }
    fn binary(&mut self, _v: &[u8]) -> Control {
        Control::Continue
    }
    fn start_map(&mut self) -> Control {
        Control::Continue
    }
    fn end_map(&mut self) -> Control {
        Control::Continue
    }
    fn start_array(&mut self) -> Control {
        Control::Continue
    }
    fn end_array(&mut self) -> Control {
        Control::Continue
    }
}

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes, fed whole. Never expect a value back, only that
    // the decoder terminates with a definite status instead of panicking.
    let mut decoder = Decoder::new(Discard::default());
    if decoder.feed(data).is_ok() {
        let _ = decoder.finish();
    }
});
