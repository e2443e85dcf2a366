use adblock_sitekey::{
    HttpClient, HttpRequest, ServerResponse, SiteKeyCheck, SiteKeyConfiguration, SiteKeyError, SiteKeySettings,
};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

/// Headers are taken from the command line, nothing is fetched.
struct OfflineClient;

impl HttpClient for OfflineClient {
    fn request(&self, request: &HttpRequest) -> Result<ServerResponse, SiteKeyError> {
        Err(SiteKeyError::TransportError(format!("offline, not fetching {}", request.url)))
    }
}

fn run(args: &[String]) -> Result<SiteKeyCheck, SiteKeyError> {
    let (url, user_agent, value) = match args {
        [url, user_agent, value, ..] => (url, user_agent, value),
        _ => {
            return Err(SiteKeyError::ConfigError(
                "usage: adblock-sitekey <url> <user-agent> <x-adblock-key value> [settings.json]".to_owned(),
            ))
        }
    };
    let settings = match args.get(3) {
        Some(path) => SiteKeySettings::from_file(path)?,
        None => SiteKeySettings::default(),
    };

    let configuration = SiteKeyConfiguration::builder()
        .with_http_client(Arc::new(OfflineClient))
        .with_settings(&settings)
        .build()?;
    log::debug!("Using {:?}", configuration);

    Ok(configuration
        .site_key_verifier()
        .check(url, Some(user_agent.as_str()), value))
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(SiteKeyCheck::Verified { key_id }) => {
            println!("verified: {}", key_id);
            ExitCode::SUCCESS
        }
        Ok(check) => {
            println!("not verified: {:?}", check);
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(2)
        }
    }
}
