use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, validate_endpoint, Settings};

pub struct ConfigUpdate {
    pub endpoint: Option<String>,
    pub timeout: Option<u64>,
    pub no_timeout: bool,
    pub log_file: Option<String>,
}

pub fn run(update: ConfigUpdate) -> Result<()> {
    let mut settings = load_settings();
    apply(&mut settings, update)?;
    save_settings(&settings)?;
    tracing::info!(endpoint = %settings.endpoint, "settings saved");
    println!("Saved settings to {}", settings_path().display());
    println!("Endpoint:   {}", settings.endpoint);
    Ok(())
}

/// Apply the requested changes; flags that were not given leave the field alone.
pub fn apply(settings: &mut Settings, update: ConfigUpdate) -> Result<()> {
    if let Some(endpoint) = update.endpoint {
        validate_endpoint(&endpoint)?;
        settings.endpoint = endpoint;
    }
    if update.no_timeout {
        settings.timeout_secs = None;
    } else if let Some(secs) = update.timeout {
        settings.timeout_secs = Some(secs);
    }
    if let Some(path) = update.log_file {
        settings.log_file = Some(path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_update() -> ConfigUpdate {
        ConfigUpdate {
            endpoint: None,
            timeout: None,
            no_timeout: false,
            log_file: None,
        }
    }

    #[test]
    fn test_apply_updates_only_given_fields() {
        let mut s = Settings::default();
        apply(
            &mut s,
            ConfigUpdate {
                timeout: Some(20),
                ..empty_update()
            },
        )
        .unwrap();
        assert_eq!(s.timeout_secs, Some(20));
        assert_eq!(s.endpoint, Settings::default().endpoint);

        apply(
            &mut s,
            ConfigUpdate {
                endpoint: Some("https://shop.example/api/dashboard".into()),
                ..empty_update()
            },
        )
        .unwrap();
        assert_eq!(s.endpoint, "https://shop.example/api/dashboard");
        assert_eq!(s.timeout_secs, Some(20));
    }

    #[test]
    fn test_no_timeout_clears() {
        let mut s = Settings {
            timeout_secs: Some(5),
            ..Settings::default()
        };
        apply(
            &mut s,
            ConfigUpdate {
                no_timeout: true,
                ..empty_update()
            },
        )
        .unwrap();
        assert_eq!(s.timeout_secs, None);
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let mut s = Settings::default();
        let err = apply(
            &mut s,
            ConfigUpdate {
                endpoint: Some("localhost".into()),
                ..empty_update()
            },
        );
        assert!(err.is_err());
        assert_eq!(s.endpoint, Settings::default().endpoint);
    }
}
