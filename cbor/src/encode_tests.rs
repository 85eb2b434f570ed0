use super::encode::*;
use hex_literal::hex;

#[test]
fn rfc_tests() {
    // RFC 8949, Appendix A:
    // https://www.rfc-editor.org/rfc/rfc8949.html#section-appendix.a

    assert_eq!(*emit(&0), hex!("00"));
    assert_eq!(*emit(&1), hex!("01"));
    assert_eq!(*emit(&10), hex!("0a"));
    assert_eq!(*emit(&23), hex!("17"));
    assert_eq!(*emit(&24), hex!("1818"));
    assert_eq!(*emit(&25), hex!("1819"));
    assert_eq!(*emit(&100), hex!("1864"));
    assert_eq!(*emit(&1000), hex!("1903e8"));
    assert_eq!(*emit(&1000000), hex!("1a000f4240"));
    assert_eq!(*emit(&1000000000000u64), hex!("1b000000e8d4a51000"));
    assert_eq!(*emit(&18446744073709551615u64), hex!("1bffffffffffffffff"));

    assert_eq!(*emit(&-1), hex!("20"));
    assert_eq!(*emit(&-10), hex!("29"));
    assert_eq!(*emit(&-100), hex!("3863"));
    assert_eq!(*emit(&-1000), hex!("3903e7"));

    assert_eq!(*emit(&false), hex!("f4"));
    assert_eq!(*emit(&true), hex!("f5"));
    assert_eq!(*emit(&None::<u8>), hex!("f7"));

    assert_eq!(*emit(&hex!("")), hex!("40"));
    assert_eq!(*emit(&hex!("01020304")), hex!("4401020304"));
    assert_eq!(*emit(""), hex!("60"));
    assert_eq!(*emit("a"), hex!("6161"));
    assert_eq!(*emit("IETF"), hex!("6449455446"));
    assert_eq!(*emit("\"\\"), hex!("62225c"));
    assert_eq!(*emit("\u{00fc}"), hex!("62c3bc"));
    assert_eq!(*emit("\u{6c34}"), hex!("63e6b0b4"));

    assert_eq!(emit_array(Some(0), |_| {}), hex!("80"));
    assert_eq!(
        emit_array(Some(3), |a| {
            a.emit(&1);
            a.emit(&2);
            a.emit(&3);
        }),
        hex!("83010203")
    );
    assert_eq!(
        emit_array(Some(3), |a| {
            a.emit(&1);
            a.emit_array(Some(2), |a| {
                a.emit(&2);
                a.emit(&3);
            });
            a.emit_array(Some(2), |a| {
                a.emit(&4);
                a.emit(&5);
            });
        }),
        hex!("8301820203820405")
    );
    assert_eq!(
        emit_array(Some(25), |a| {
            for i in 1..=25 {
                a.emit(&i);
            }
        }),
        hex!("98190102030405060708090a0b0c0d0e0f101112131415161718181819")
    );

    assert_eq!(emit_array(None, |_| {}), hex!("9fff"));
    assert_eq!(
        emit_array(None, |a| {
            a.emit(&1);
            a.emit_array(Some(2), |a| {
                a.emit(&2);
                a.emit(&3);
            });
            a.emit_array(None, |a| {
                a.emit(&4);
                a.emit(&5);
            });
        }),
        hex!("9f018202039f0405ffff")
    );
    assert_eq!(
        emit_array(Some(3), |a| {
            a.emit(&1);
            a.emit_array(Some(2), |a| {
                a.emit(&2);
                a.emit(&3);
            });
            a.emit_array(None, |a| {
                a.emit(&4);
                a.emit(&5);
            });
        }),
        hex!("83018202039f0405ff")
    );
}

#[test]
fn slice_encode() {
    let mut e = Encoder::new();
    e.emit_slice(&[1u16, 2, 3]);
    assert_eq!(e.build(), hex!("83010203"));
}

#[test]
fn raw_and_measured() {
    let mut e = Encoder::new();
    let mut range = 0..0;
    e.emit_array(Some(2), |a| {
        a.emit_raw_slice(&hex!("17"));
        range = a.emit_bytes(b"abc");
    });
    assert_eq!(range, 3..6);
    assert_eq!(e.build(), hex!("821743616263"));
}

#[test]
#[should_panic]
fn too_many_items() {
    emit_array(Some(1), |a| {
        a.emit(&1);
        a.emit(&2);
    });
}

#[test]
#[should_panic]
fn too_few_items() {
    emit_array(Some(2), |a| {
        a.emit(&1);
    });
}
