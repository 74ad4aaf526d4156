/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

mod common;

use common::*;
use ironofx::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_round_trip_v1() {
    init_tracing();
    let original = envelope();
    let text = ironofx::marshal(&original, OfxVersion::V1).unwrap();
    assert!(text.starts_with("OFXHEADER:100\r\n"));

    let parsed: ResponseEnvelope = ironofx::unmarshal(&text).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_round_trip_v2() {
    init_tracing();
    let original = envelope();
    let text = ironofx::marshal(&original, OfxVersion::V2).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\" ?><?OFX OFXHEADER=\"200\""));

    let parsed: ResponseEnvelope = ironofx::unmarshal(&text).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_round_trip_v1_on_new_lines() {
    init_tracing();
    let original = envelope();
    let config = MarshalConfig::new(OfxVersion::V1).with_attributes_on_new_line(true);
    let text = ironofx::marshal_with(&original, &config).unwrap();
    assert!(text.contains("<SONRS>\r\n<STATUS>\r\n<CODE>0\r\n<SEVERITY>INFO\r\n</STATUS>\r\n"));

    let parsed: ResponseEnvelope = ironofx::unmarshal(&text).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_round_trip_bytes() {
    init_tracing();
    let mut original = envelope();
    if let Some(account) = original.account.as_mut() {
        account.account_id = Some("Société Générale".to_string());
    }
    let registry = Registry::global();
    let bytes = Marshaller::new(registry)
        .marshal_to_bytes(&original, &MarshalConfig::default())
        .unwrap();
    assert!(bytes.windows(2).any(|w| w == b"\xe9t"));

    let parsed: ResponseEnvelope = ironofx::unmarshal_bytes(&bytes).unwrap();
    assert_eq!(parsed, original);
}

#[test]
fn test_round_trip_without_optional_content() {
    init_tracing();
    let original = ResponseEnvelope {
        security: Some("TYPE1".to_string()),
        old_file_uid: Some("NONE".to_string()),
        new_file_uid: Some("NONE".to_string()),
        positions: Some(PositionList::default()),
        ..ResponseEnvelope::default()
    };
    for version in [OfxVersion::V1, OfxVersion::V2] {
        let text = ironofx::marshal(&original, version).unwrap();
        let parsed: ResponseEnvelope = ironofx::unmarshal(&text).unwrap();
        assert_eq!(parsed, original);
    }
}
