use super::decode::*;
use hex_literal::hex;

#[test]
fn rfc_tests() {
    // RFC 8949, Appendix A:
    // https://www.rfc-editor.org/rfc/rfc8949.html#section-appendix.a

    assert_eq!(0u64, parse(&hex!("00")).unwrap());
    assert_eq!(1u64, parse(&hex!("01")).unwrap());
    assert_eq!(10u64, parse(&hex!("0a")).unwrap());
    assert_eq!(23u64, parse(&hex!("17")).unwrap());
    assert_eq!(24u64, parse(&hex!("1818")).unwrap());
    assert_eq!(25u64, parse(&hex!("1819")).unwrap());
    assert_eq!(100u64, parse(&hex!("1864")).unwrap());
    assert_eq!(1000u64, parse(&hex!("1903e8")).unwrap());
    assert_eq!(1000000u64, parse(&hex!("1a000f4240")).unwrap());
    assert_eq!(1000000000000u64, parse(&hex!("1b000000e8d4a51000")).unwrap());
    assert_eq!(
        18446744073709551615u64,
        parse(&hex!("1bffffffffffffffff")).unwrap()
    );

    /* We do not support BIGNUMs */
    assert!(parse::<u64>(&hex!("c249010000000000000000")).is_err());
    assert!(parse::<i64>(&hex!("3bffffffffffffffff")).is_err());

    assert_eq!(-1i64, parse(&hex!("20")).unwrap());
    assert_eq!(-10i64, parse(&hex!("29")).unwrap());
    assert_eq!(-100i64, parse(&hex!("3863")).unwrap());
    assert_eq!(-1000i64, parse(&hex!("3903e7")).unwrap());

    assert!(!parse::<bool>(&hex!("f4")).unwrap());
    assert!(parse::<bool>(&hex!("f5")).unwrap());

    assert_eq!(Vec::<u8>::new(), parse::<Vec<u8>>(&hex!("40")).unwrap());
    assert_eq!(
        hex!("01020304").to_vec(),
        parse::<Vec<u8>>(&hex!("4401020304")).unwrap()
    );
    assert_eq!("", parse::<String>(&hex!("60")).unwrap());
    assert_eq!("a", parse::<String>(&hex!("6161")).unwrap());
    assert_eq!("IETF", parse::<String>(&hex!("6449455446")).unwrap());
    assert_eq!("\"\\", parse::<String>(&hex!("62225c")).unwrap());
    assert_eq!("\u{00fc}", parse::<String>(&hex!("62c3bc")).unwrap());
    assert_eq!("\u{6c34}", parse::<String>(&hex!("63e6b0b4")).unwrap());

    /* Floats, maps and tags are not supported */
    assert_eq!(
        parse::<u64>(&hex!("f93c00")).unwrap_err(),
        Error::Unsupported(7)
    );
    assert!(parse_array(&hex!("a0"), |_| Ok::<_, Error>(())).is_err());
    assert_eq!(
        parse::<u64>(&hex!("c11a514b67b0")).unwrap_err(),
        Error::Unsupported(6)
    );
}

#[test]
fn simple_values() {
    fn check(data: &[u8], expected: Value<'_>) {
        parse_value(data, |v| {
            assert_eq!(v, expected);
            Ok::<_, Error>(())
        })
        .unwrap();
    }
    check(&hex!("f6"), Value::Null);
    check(&hex!("f7"), Value::Undefined);
    check(&hex!("f0"), Value::Simple(16));
    check(&hex!("f8ff"), Value::Simple(255));
}

#[test]
fn arrays() {
    let (v, len) = parse_array(&hex!("83010203"), |a| {
        assert_eq!(a.count(), Some(3));
        Ok::<_, Error>((
            a.parse::<u64>()?,
            a.parse::<u64>()?,
            a.parse::<u64>()?,
        ))
    })
    .unwrap();
    assert_eq!(v, (1, 2, 3));
    assert_eq!(len, 4);

    let (v, len) = parse_array(&hex!("8301820203820405"), |a| {
        let one = a.parse::<u64>()?;
        let two = a.parse_array(|a| Ok::<_, Error>(a.parse::<u64>()? + a.parse::<u64>()?))?;
        let three = a.parse_array(|a| Ok::<_, Error>(a.parse::<u64>()? + a.parse::<u64>()?))?;
        Ok::<_, Error>((one, two, three))
    })
    .unwrap();
    assert_eq!(v, (1, 5, 9));
    assert_eq!(len, 8);

    let (v, len) = parse_array(&hex!("9f018202039f0405ffff"), |a| {
        assert!(!a.is_definite());
        let one = a.parse::<u64>()?;
        a.skip_value()?;
        let inner = a.parse_array(|a| {
            let mut items = Vec::new();
            while let Some(v) = a.try_parse::<u64>()? {
                items.push(v);
            }
            Ok::<_, Error>(items)
        })?;
        Ok::<_, Error>((one, inner))
    })
    .unwrap();
    assert_eq!(v, (1, vec![4, 5]));
    assert_eq!(len, 10);

    let (v, _) = parse_array(&hex!("98190102030405060708090a0b0c0d0e0f101112131415161718181819"), |a| {
        let mut sum = 0u64;
        while let Some(v) = a.try_parse::<u64>()? {
            sum += v;
        }
        Ok::<_, Error>(sum)
    })
    .unwrap();
    assert_eq!(v, 325);
}

#[test]
fn array_errors() {
    // Unconsumed items
    assert_eq!(
        parse_array(&hex!("820102"), |a| a.parse::<u64>()).unwrap_err(),
        Error::AdditionalItems
    );
    assert_eq!(
        parse_array(&hex!("9f0102ff"), |a| a.parse::<u64>()).unwrap_err(),
        Error::AdditionalItems
    );

    // Reading past the end
    assert_eq!(
        parse_array(&hex!("8101"), |a| {
            a.parse::<u64>()?;
            a.parse::<u64>()
        })
        .unwrap_err(),
        Error::NotEnoughItems
    );

    // Truncated input
    assert_eq!(
        parse_array(&hex!("9f01"), |a| a.parse::<u64>()).unwrap_err(),
        Error::NotEnoughData
    );
    assert_eq!(
        parse::<Vec<u8>>(&hex!("440102")).unwrap_err(),
        Error::NotEnoughData
    );
    assert_eq!(parse::<u64>(&hex!("19ff")).unwrap_err(), Error::NotEnoughData);
}

#[test]
fn narrowing() {
    assert_eq!(255u8, parse(&hex!("18ff")).unwrap());
    assert_eq!(parse::<u8>(&hex!("190100")).unwrap_err(), Error::OutOfRange(256));
}
