//! Address codec round trips.

use gl_knx::{GroupAddress, IndividualAddress};

#[test]
fn group_addresses_roundtrip_text_and_wire() {
    for text in ["0/0/1", "1/2/3", "31/7/255", "15/0/64"] {
        let parsed: GroupAddress = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text);
        assert_eq!(GroupAddress::from_u16(parsed.to_u16()), parsed);
    }
}

#[test]
fn individual_addresses_roundtrip_text_and_wire() {
    for text in ["0.0.0", "1.1.128", "15.15.255"] {
        let parsed: IndividualAddress = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text);
        assert_eq!(IndividualAddress::from_u16(parsed.to_u16()), parsed);
    }
}

#[test]
fn invalid_addresses_fail_to_parse() {
    for text in ["", "1/2", "1/2/3/4", "32/0/0", "0/8/0", "0/0/256", "a/b/c"] {
        assert!(text.parse::<GroupAddress>().is_err(), "group accepted {text:?}");
    }
    for text in ["", "1.2", "1.2.3.4", "16.0.0", "0.16.0", "0.0.256", "1/2/3"] {
        assert!(
            text.parse::<IndividualAddress>().is_err(),
            "individual accepted {text:?}"
        );
    }
}
