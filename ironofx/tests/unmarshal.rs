/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

mod common;

use common::*;
use ironofx::prelude::*;
use pretty_assertions::assert_eq;

const V1_SIGNON: &str = "OFXHEADER:100\r\n\
    DATA:OFXSGML\r\n\
    VERSION:102\r\n\
    SECURITY:NONE\r\n\
    ENCODING:USASCII\r\n\
    CHARSET:1252\r\n\
    COMPRESSION:NONE\r\n\
    OLDFILEUID:NONE\r\n\
    NEWFILEUID:abc123\r\n\
    \r\n\
    <OFX>\r\n\
    <SIGNONMSGSRSV1>\r\n\
    <SONRS>\r\n\
    <STATUS>\r\n\
    <CODE>0\r\n\
    <SEVERITY>INFO\r\n\
    </STATUS>\r\n\
    <DTSERVER>20230115120000.000[-5:EST]\r\n\
    <LANGUAGE>ENG\r\n\
    </SONRS>\r\n\
    </SIGNONMSGSRSV1>\r\n\
    </OFX>\r\n";

const V2_SIGNON: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n\
    <?OFX OFXHEADER=\"200\" VERSION=\"202\" SECURITY=\"NONE\" OLDFILEUID=\"NONE\" NEWFILEUID=\"abc123\"?>\n\
    <OFX>\n\
      <SIGNONMSGSRSV1>\n\
        <SONRS>\n\
          <STATUS>\n\
            <CODE>0</CODE>\n\
            <SEVERITY>INFO</SEVERITY>\n\
          </STATUS>\n\
          <DTSERVER>20230115120000.000[-5:EST]</DTSERVER>\n\
          <LANGUAGE>ENG</LANGUAGE>\n\
        </SONRS>\n\
      </SIGNONMSGSRSV1>\n\
    </OFX>\n";

fn signon(envelope: &ResponseEnvelope) -> &SignonResponse {
    envelope
        .signon
        .as_ref()
        .and_then(|s| s.response.as_ref())
        .unwrap()
}

#[test]
fn test_v1_and_v2_yield_the_same_envelope() {
    init_tracing();
    let v1: ResponseEnvelope = ironofx::unmarshal(V1_SIGNON).unwrap();
    let v2: ResponseEnvelope = ironofx::unmarshal(V2_SIGNON).unwrap();
    assert_eq!(v1, v2);

    assert_eq!(v1.security.as_deref(), Some("NONE"));
    assert_eq!(v1.old_file_uid.as_deref(), Some("NONE"));
    assert_eq!(v1.new_file_uid.as_deref(), Some("abc123"));
    assert_eq!(signon(&v1).language.as_deref(), Some("ENG"));
}

#[test]
fn test_detected_versions() {
    init_tracing();
    let unmarshaller = Unmarshaller::new(Registry::global());
    let (_, v1) = unmarshaller
        .unmarshal_versioned(V1_SIGNON, Box::new(ResponseEnvelope::default()))
        .unwrap();
    let (_, v2) = unmarshaller
        .unmarshal_versioned(V2_SIGNON, Box::new(ResponseEnvelope::default()))
        .unwrap();
    assert_eq!(v1, OfxVersion::V1);
    assert_eq!(v2, OfxVersion::V2);
}

#[test]
fn test_date_fidelity() {
    init_tracing();
    let envelope: ResponseEnvelope = ironofx::unmarshal(V1_SIGNON).unwrap();
    let server_date = signon(&envelope).server_date.unwrap();
    assert_eq!(server_date.to_rfc3339(), "2023-01-15T17:00:00+00:00");

    let text = ironofx::marshal(&envelope, OfxVersion::V2).unwrap();
    assert!(text.contains("<DTSERVER>20230115170000.000[0:GMT]</DTSERVER>"));
}

#[test]
fn test_status_code() {
    init_tracing();
    let envelope: ResponseEnvelope = ironofx::unmarshal(V1_SIGNON).unwrap();
    let status = signon(&envelope).status.clone().unwrap();
    assert_eq!(status.code, Some(StatusCode::Known(KnownCode::Success)));
    assert_eq!(status.severity, Some(Severity::Info));
}

#[test]
fn test_unknown_status_code_is_wrapped() {
    init_tracing();
    let text = V1_SIGNON.replace("<CODE>0", "<CODE>31337");
    let envelope: ResponseEnvelope = ironofx::unmarshal(&text).unwrap();
    let code = signon(&envelope)
        .status
        .as_ref()
        .and_then(|s| s.code.clone())
        .unwrap();
    assert!(!code.is_known());
    assert_eq!(code.code(), 31337);
    assert_eq!(code.message(), "Unknown status code.");
    assert_eq!(code.default_severity(), Severity::Error);
}

#[test]
fn test_repeated_element_follows_wire_order() {
    init_tracing();
    let envelope: ResponseEnvelope =
        ironofx::unmarshal("<OFX><DTPAIR><DT>20230101<DT>20230105</DTPAIR></OFX>").unwrap();
    let dates = envelope.dates.unwrap();
    assert_eq!(dates.traded.as_deref(), Some("20230101"));
    assert_eq!(dates.settled.as_deref(), Some("20230105"));
}

#[test]
fn test_polymorphic_positions() {
    init_tracing();
    let text = "<OFX>\
        <INVPOSLIST>\
        <POSSTOCK><SECID><UNIQUEID>037833100<UNIQUEIDTYPE>CUSIP</SECID>\
        <HELDINACCT>CASH<UNITS>100<REINVDIV>Y</POSSTOCK>\
        <POSMF><SECID><UNIQUEID>922908363<UNIQUEIDTYPE>CUSIP</SECID>\
        <HELDINACCT>MARGIN<UNITS>12.5<REINVCG>N</POSMF>\
        <POSOTHER><SECID><UNIQUEID>999999999<UNIQUEIDTYPE>CUSIP</SECID>\
        <HELDINACCT>OTHER<UNITS>1</POSOTHER>\
        </INVPOSLIST>\
        </OFX>";
    let envelope: ResponseEnvelope = ironofx::unmarshal(text).unwrap();
    let positions = envelope.positions.unwrap().positions;
    assert_eq!(positions.len(), 3);

    let stock = positions[0].view::<StockPosition>().unwrap();
    assert_eq!(stock.reinvest_dividends, Some(true));
    assert_eq!(stock.base.units, Some(Decimal::from(100)));

    let fund = positions[1].view::<MutualFundPosition>().unwrap();
    assert_eq!(fund.reinvest_capital_gains, Some(false));
    assert_eq!(fund.base.units, Some(Decimal::new(125, 1)));
    assert_eq!(fund.base.held_in_account.as_deref(), Some("MARGIN"));

    let other = positions[2].view::<OtherPosition>().unwrap();
    assert_eq!(
        other.base.security_id.as_ref().and_then(|s| s.unique_id.as_deref()),
        Some("999999999")
    );

    for position in &positions {
        assert!(position.view::<BasePosition>().is_some());
    }
    assert!(positions[0].view::<MutualFundPosition>().is_none());
}

#[test]
fn test_unknown_aggregate_keeps_siblings() {
    init_tracing();
    let text = "<OFX>\
        <SIGNONMSGSRSV1><SONRS><STATUS><CODE>0<SEVERITY>INFO</STATUS>\
        <DTSERVER>20230115</SONRS></SIGNONMSGSRSV1>\
        <CREDITCARDMSGSRSV1><CCSTMTTRNRS><TRNUID>1<STATUS><CODE>0<SEVERITY>INFO</STATUS>\
        </CCSTMTTRNRS></CREDITCARDMSGSRSV1>\
        <BANKACCTFROM><BANKID>121000248<ACCTID>42<ACCTTYPE>SAVINGS<EXTRA>ignored</BANKACCTFROM>\
        </OFX>";
    let envelope: ResponseEnvelope = ironofx::unmarshal(text).unwrap();
    assert!(envelope.signon.is_some());

    let account = envelope.account.unwrap();
    assert_eq!(account.account_id.as_deref(), Some("42"));
    assert_eq!(account.account_type, Some(AccountType::Savings));
}

#[test]
fn test_entities_are_unescaped() {
    init_tracing();
    let text = "<OFX><BANKACCTFROM><BANKID>1<ACCTID>A&amp;B &#60;3&#x3E;<ACCTTYPE>CHECKING</BANKACCTFROM></OFX>";
    let envelope: ResponseEnvelope = ironofx::unmarshal(text).unwrap();
    assert_eq!(
        envelope.account.unwrap().account_id.as_deref(),
        Some("A&B <3>")
    );
}

#[test]
fn test_unknown_enum_key_is_dropped() {
    init_tracing();
    let text = "<OFX><BANKACCTFROM><BANKID>1<ACCTID>2<ACCTTYPE>BROKERAGE</BANKACCTFROM>\
                <DTPAIR><DT>20230101</DTPAIR></OFX>";
    let envelope: ResponseEnvelope = ironofx::unmarshal(text).unwrap();
    let account = envelope.account.unwrap();
    assert_eq!(account.bank_id.as_deref(), Some("1"));
    assert_eq!(account.account_id.as_deref(), Some("2"));
    assert_eq!(account.account_type, None);
    assert_eq!(envelope.dates.unwrap().traded.as_deref(), Some("20230101"));

    let err = DefaultStringConversion
        .from_wire(AccountType::KIND, "BROKERAGE")
        .unwrap_err();
    assert!(matches!(
        err,
        ConversionError::UnknownEnumKey { ref key, expected }
            if key == "BROKERAGE" && expected == "AccountType"
    ));
}

#[test]
fn test_malformed_date_offset_is_dropped() {
    init_tracing();
    let text = "<OFX><SIGNONMSGSRSV1><SONRS><STATUS><CODE>0<SEVERITY>INFO</STATUS>\
                <DTSERVER>20230115120000[inf:X]<LANGUAGE>ENG</SONRS></SIGNONMSGSRSV1></OFX>";
    let envelope: ResponseEnvelope = ironofx::unmarshal(text).unwrap();
    let response = signon(&envelope);
    assert_eq!(response.server_date, None);
    assert_eq!(response.language.as_deref(), Some("ENG"));
    assert!(response.status.is_some());
}

#[test]
fn test_structural_errors() {
    init_tracing();
    let err = ironofx::unmarshal::<ResponseEnvelope>("OFXHEADER:100\r\n\r\n").unwrap_err();
    assert!(matches!(err, OfxError::Parse(ParseError::NoRootElement)));

    let err = ironofx::unmarshal::<ResponseEnvelope>(
        "<?OFX OFXHEADER=\"200\"?><OFX><SIGNONMSGSRSV1></OFX>",
    )
    .unwrap_err();
    assert!(err.is_parse_error());

    let err = ironofx::unmarshal::<SignonMessages>("<OFX></OFX>").unwrap_err();
    assert!(matches!(
        err,
        OfxError::Parse(ParseError::UnexpectedRoot { ref expected, .. }) if expected == "SIGNONMSGSRSV1"
    ));
}
