/*!
A small CBOR (RFC 8949) codec covering what BPv7 bundle framing needs:
unsigned and negative integers, byte and text strings, simple values, and
definite or indefinite length arrays.

Maps, tags and floating point values are rejected by the decoder and have no
encoder support.
*/

pub mod decode;
pub mod encode;

#[cfg(test)]
mod decode_tests;

#[cfg(test)]
mod encode_tests;
