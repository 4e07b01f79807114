use crate::error::Result;
use crate::settings::{settings_file_exists, settings_path, Settings};

pub fn run(settings: &Settings) -> Result<()> {
    let path = settings_path();
    let saved = if settings_file_exists() { "" } else { " (not saved; using defaults)" };
    println!("Settings:   {}{saved}", path.display());
    println!("Endpoint:   {}", settings.endpoint);
    println!("Timeout:    {}", describe_timeout(settings.timeout_secs));
    println!("Log file:   {}", settings.log_path().display());
    Ok(())
}

fn describe_timeout(secs: Option<u64>) -> String {
    match secs {
        Some(s) => format!("{s}s"),
        None => "none (waits indefinitely)".to_string(),
    }
}
