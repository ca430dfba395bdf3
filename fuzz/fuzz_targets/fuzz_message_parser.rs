#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use priot::ber::Decoder;
use priot::pdu::Pdu;
use priot::v3::UsmSecurityParams;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    // Fuzz the classic SNMP PDU decoder (tag-driven, covers all PDU types).
    let mut decoder = Decoder::new(bytes.clone());
    let _ = Pdu::decode_tagged(&mut decoder);

    // Fuzz the USMsecurityParameters decoder.
    let mut decoder = Decoder::new(bytes);
    let _ = UsmSecurityParams::decode(&mut decoder);
});
