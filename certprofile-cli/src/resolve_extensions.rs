use std::error::Error;
use clap::Parser;
use certprofile::{Profile, ProfileConf};
use certprofile::profile::ExtensionRequest;
use certprofile::profile::controls::extension_type;
use certprofile_x509::certificate::Name;
use certprofile_x509::certificate::extensions::{Extension, Extensions};
use certprofile_x509::certificate::oids;
use time::OffsetDateTime;
use tracing::info;
use hex;

/// `OID_OR_NAME[!]=HEX`, `!` marking the extension critical.
fn extension_parser (input: &str) -> Result<Extension, String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not of the form type=hex", input))?;
    let (name, critical) = match name.strip_suffix('!') {
        Some(name) => (name, true),
        None => (name, false),
    };
    let oid = extension_type(name).map_err(|e| e.to_string())?;
    let value = hex::decode(value.trim()).map_err(|e| e.to_string())?;
    Ok(Extension::new(oid, critical, value))
}

fn subject_parser (input: &str) -> Result<Name, String> {
    input.parse::<Name>()
}

#[derive(Parser, Debug)]
#[command(name = "resolve_extensions")]
#[command(about = "Compile a certificate profile and resolve the extensions it emits for one request.", long_about = None)]
struct Cli {
    #[arg(
        long,
        short = 'p',
        value_name = "PROFILE_JSON",
        required = true,
        help = "Path of the profile, as JSON."
    )]
    profile: String,

    #[arg(
        long,
        short = 's',
        value_name = "SUBJECT",
        required = true,
        value_parser = subject_parser,
        help = "Requested subject, e.g. C=DE,O=Acme,CN=Alice."
    )]
    subject: Name,

    #[arg(
        long,
        short = 'e',
        value_name = "TYPE=HEX",
        value_parser = extension_parser,
        help = "Request extension, repeatable. Suffix the type with ! to mark it critical."
    )]
    extension: Vec<Extension>,
}

fn main () -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let conf: ProfileConf = serde_json::from_str(&std::fs::read_to_string(&args.profile)?)?;
    let profile = Profile::compile(&conf)?;

    let granted = profile.grant_subject(&args.subject)?;
    let now = OffsetDateTime::now_utc().replace_nanosecond(0)?;
    let not_before = profile.not_before(None, now);
    let not_after = profile
        .not_after(not_before)
        .ok_or("notAfter is out of range")?;
    info!(%not_before, %not_after, subject = %granted, "resolving extensions");

    let requested_extensions = Extensions(args.extension);
    let values = profile.resolve_extensions(&ExtensionRequest {
        requested_subject: &args.subject,
        granted_subject: &granted,
        requested_extensions: &requested_extensions,
        not_before,
        not_after,
        ca_info: None,
    })?;

    let output: Vec<serde_json::Value> = values
        .iter()
        .map(|(oid, value)| serde_json::json!({
            "oid": oids::dotted(oid),
            "name": oids::display_name(oid),
            "critical": value.critical,
            "value": hex::encode(&value.value),
        }))
        .collect();
    println!("{}", serde_json::to_string_pretty(&serde_json::json!({
        "subject": granted.to_string(),
        "extensions": output,
    }))?);

    Ok(())
}
