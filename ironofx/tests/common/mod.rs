/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Domain aggregates shared by the integration tests.

#![allow(dead_code)]

use ironofx::prelude::*;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

wire_enum! {
    /// Kind of bank account.
    pub enum AccountType {
        Checking => "CHECKING",
        Savings => "SAVINGS",
        MoneyMarket => "MONEYMRKT",
        CreditLine => "CREDITLINE",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "SONRS")]
pub struct SignonResponse {
    #[ofx(child, order = 0, required)]
    pub status: Option<Status>,
    #[ofx(element = "DTSERVER", order = 10, required)]
    pub server_date: Option<DateTime<Utc>>,
    #[ofx(element = "LANGUAGE", order = 30)]
    pub language: Option<String>,
    #[ofx(element = "DTPROFUP", order = 40)]
    pub profile_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "SIGNONMSGSRSV1")]
pub struct SignonMessages {
    #[ofx(child = "SONRS", order = 0, required)]
    pub response: Option<SignonResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "BANKACCTFROM")]
pub struct BankAccount {
    #[ofx(element = "BANKID", order = 0, required)]
    pub bank_id: Option<String>,
    #[ofx(element = "ACCTID", order = 20, required)]
    pub account_id: Option<String>,
    #[ofx(element = "ACCTTYPE", order = 30, required)]
    pub account_type: Option<AccountType>,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "SECID")]
pub struct SecurityId {
    #[ofx(element = "UNIQUEID", order = 0, required)]
    pub unique_id: Option<String>,
    #[ofx(element = "UNIQUEIDTYPE", order = 10, required)]
    pub unique_id_type: Option<String>,
}

/// Fields every position shares.
#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
pub struct BasePosition {
    #[ofx(child = "SECID", order = 0, required)]
    pub security_id: Option<SecurityId>,
    #[ofx(element = "HELDINACCT", order = 10, required)]
    pub held_in_account: Option<String>,
    #[ofx(element = "UNITS", order = 30, required)]
    pub units: Option<Decimal>,
    #[ofx(element = "UNITPRICE", order = 40)]
    pub unit_price: Option<Decimal>,
    #[ofx(element = "MEMO", order = 70)]
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "POSSTOCK")]
pub struct StockPosition {
    #[ofx(base)]
    pub base: BasePosition,
    #[ofx(element = "UNITSSTREET", order = 100)]
    pub units_street: Option<Decimal>,
    #[ofx(element = "REINVDIV", order = 120)]
    pub reinvest_dividends: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "POSMF")]
pub struct MutualFundPosition {
    #[ofx(base)]
    pub base: BasePosition,
    #[ofx(element = "REINVDIV", order = 100)]
    pub reinvest_dividends: Option<bool>,
    #[ofx(element = "REINVCG", order = 110)]
    pub reinvest_capital_gains: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "POSOTHER")]
pub struct OtherPosition {
    #[ofx(base)]
    pub base: BasePosition,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "INVPOSLIST")]
pub struct PositionList {
    #[ofx(collection, entry = BasePosition, order = 0)]
    pub positions: Vec<Box<dyn ironofx::meta::Aggregate>>,
}

/// Two elements sharing a tag, declared out of wire order.
#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "DTPAIR")]
pub struct DatePair {
    #[ofx(element = "DT", order = 50)]
    pub settled: Option<String>,
    #[ofx(element = "DT", order = 10)]
    pub traded: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "OFX")]
pub struct ResponseEnvelope {
    #[ofx(header = "SECURITY")]
    pub security: Option<String>,
    #[ofx(header = "OLDFILEUID")]
    pub old_file_uid: Option<String>,
    #[ofx(header = "NEWFILEUID")]
    pub new_file_uid: Option<String>,
    #[ofx(child = "SIGNONMSGSRSV1", order = 0)]
    pub signon: Option<SignonMessages>,
    #[ofx(child = "BANKACCTFROM", order = 10)]
    pub account: Option<BankAccount>,
    #[ofx(child = "INVPOSLIST", order = 20)]
    pub positions: Option<PositionList>,
    #[ofx(child = "DTPAIR", order = 30)]
    pub dates: Option<DatePair>,
}

pub fn security_id(id: &str) -> SecurityId {
    SecurityId {
        unique_id: Some(id.to_string()),
        unique_id_type: Some("CUSIP".to_string()),
    }
}

pub fn base_position(id: &str, units: i64) -> BasePosition {
    BasePosition {
        security_id: Some(security_id(id)),
        held_in_account: Some("CASH".to_string()),
        units: Some(Decimal::from(units)),
        unit_price: None,
        memo: None,
    }
}

/// A fully populated envelope.
pub fn envelope() -> ResponseEnvelope {
    let server_date = "2023-01-15T17:00:00Z".parse::<DateTime<Utc>>().ok();
    ResponseEnvelope {
        security: Some("NONE".to_string()),
        old_file_uid: Some("NONE".to_string()),
        new_file_uid: Some("1f2e3d".to_string()),
        signon: Some(SignonMessages {
            response: Some(SignonResponse {
                status: Some(Status::success()),
                server_date,
                language: Some("ENG".to_string()),
                profile_updated: None,
            }),
        }),
        account: Some(BankAccount {
            bank_id: Some("121000248".to_string()),
            account_id: Some("0001 & 0002".to_string()),
            account_type: Some(AccountType::Checking),
        }),
        positions: Some(PositionList {
            positions: vec![
                Box::new(StockPosition {
                    base: base_position("037833100", 100),
                    units_street: Some(Decimal::new(1005, 1)),
                    reinvest_dividends: Some(true),
                }),
                Box::new(MutualFundPosition {
                    base: BasePosition {
                        memo: Some("Growth fund".to_string()),
                        ..base_position("922908363", 12)
                    },
                    reinvest_dividends: Some(false),
                    reinvest_capital_gains: Some(true),
                }),
                Box::new(OtherPosition {
                    base: base_position("999999999", 1),
                }),
            ],
        }),
        dates: Some(DatePair {
            settled: Some("20230105".to_string()),
            traded: Some("20230101".to_string()),
        }),
    }
}
