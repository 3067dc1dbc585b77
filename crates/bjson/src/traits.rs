//! Callback interface implemented by decoder consumers.

use crate::types::Control;

/// One method per token kind the decoder can emit. Implemented by
/// whatever the caller wants to build from a decoded stream (a DOM,
/// a re-encoder, a counter, ...).
///
/// `number` is reserved for future text-preserving numerics; the wire
/// format has no such token today and the decoder never calls it, but
/// the default body lets existing sinks compile without implementing it.
pub trait TokenSink {
    fn null(&mut self) -> Control;
    fn boolean(&mut self, v: bool) -> Control;
    fn integer(&mut self, v: i64) -> Control;
    fn double(&mut self, v: f64) -> Control;
    fn string(&mut self, v: &[u8]) -> Control;
    fn map_key(&mut self, v: &[u8]) -> Control;
    fn binary(&mut self, v: &[u8]) -> Control;
    fn start_map(&mut self) -> Control;
    fn end_map(&mut self) -> Control;
    fn start_array(&mut self) -> Control;
    fn end_array(&mut self) -> Control;

    fn number(&mut self, _v: &[u8]) -> Control {
        Control::Continue
    }
}
