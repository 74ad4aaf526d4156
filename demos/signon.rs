/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 19/10/26
******************************************************************************/

//! Reads an OFX 1 signon response and writes it back as OFX 2.
use ironofx::prelude::*;
use tracing::info;

const RESPONSE: &str = "OFXHEADER:100\r\n\
    DATA:OFXSGML\r\n\
    VERSION:102\r\n\
    SECURITY:NONE\r\n\
    ENCODING:USASCII\r\n\
    CHARSET:1252\r\n\
    COMPRESSION:NONE\r\n\
    OLDFILEUID:NONE\r\n\
    NEWFILEUID:NONE\r\n\
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
    <FI><ORG>Example Bank<FID>1234</FI>\r\n\
    </SONRS>\r\n\
    </SIGNONMSGSRSV1>\r\n\
    </OFX>\r\n";

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "SONRS")]
struct SignonResponse {
    #[ofx(child, order = 0, required)]
    status: Option<Status>,
    #[ofx(element = "DTSERVER", order = 10, required)]
    server_date: Option<DateTime<Utc>>,
    #[ofx(element = "LANGUAGE", order = 30)]
    language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "SIGNONMSGSRSV1")]
struct SignonMessages {
    #[ofx(child = "SONRS", order = 0, required)]
    response: Option<SignonResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Aggregate)]
#[ofx(name = "OFX")]
struct ResponseEnvelope {
    #[ofx(header = "SECURITY")]
    security: Option<String>,
    #[ofx(header = "NEWFILEUID")]
    new_file_uid: Option<String>,
    #[ofx(child = "SIGNONMSGSRSV1", order = 0)]
    signon: Option<SignonMessages>,
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let envelope: ResponseEnvelope = ironofx::unmarshal(RESPONSE)?;
    let response = envelope
        .signon
        .as_ref()
        .and_then(|signon| signon.response.as_ref())
        .ok_or("signon response missing")?;
    if let Some(status) = &response.status {
        info!(ok = status.is_ok(), code = ?status.code, "Signon status");
    }
    if let Some(date) = response.server_date {
        info!(server_date = %date.to_rfc3339(), "Server time");
    }

    let config = MarshalConfig::new(OfxVersion::V2).with_attributes_on_new_line(true);
    println!("{}", ironofx::marshal_with(&envelope, &config)?);
    Ok(())
}
