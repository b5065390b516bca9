use std::error::Error;
use clap::Parser;
use certprofile::{Profile, ProfileConf};
use certprofile_x509::certificate::Name;
use tracing::info;

fn subject_parser (input: &str) -> Result<Name, String> {
    input.parse::<Name>()
}

#[derive(Parser, Debug)]
#[command(name = "validate_subject")]
#[command(about = "Check a requested subject against a certificate profile and print the subject it would be granted.", long_about = None)]
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
}

fn main () -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    let conf: ProfileConf = serde_json::from_str(&std::fs::read_to_string(&args.profile)?)?;
    let profile = Profile::compile(&conf)?;
    info!(profile = profile.name().unwrap_or("-"), "compiled profile");

    let granted = profile.grant_subject(&args.subject)?;
    println!("{}", granted);

    Ok(())
}
