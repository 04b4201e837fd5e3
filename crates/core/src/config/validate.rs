use super::{
    types::{ClientBackend, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - sweep.download_dir is not empty
/// - the selected backend has its section and sane values
/// - schedule.interval_secs is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.sweep.download_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "sweep.download_dir cannot be empty".to_string(),
        ));
    }

    match config.client.backend {
        ClientBackend::Transmission => {
            let transmission = config.client.transmission.clone().unwrap_or_default();
            if transmission.host.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "client.transmission.host cannot be empty".to_string(),
                ));
            }
            if transmission.port == 0 {
                return Err(ConfigError::ValidationError(
                    "client.transmission.port cannot be 0".to_string(),
                ));
            }
            if transmission.timeout_secs == 0 {
                return Err(ConfigError::ValidationError(
                    "client.transmission.timeout_secs cannot be 0".to_string(),
                ));
            }
        }
        ClientBackend::QBittorrent => {
            let qbit = config.client.qbittorrent.as_ref().ok_or_else(|| {
                ConfigError::ValidationError(
                    "client.qbittorrent section is required for the qbittorrent backend"
                        .to_string(),
                )
            })?;
            if qbit.url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "client.qbittorrent.url cannot be empty".to_string(),
                ));
            }
            if qbit.timeout_secs == 0 {
                return Err(ConfigError::ValidationError(
                    "client.qbittorrent.timeout_secs cannot be 0".to_string(),
                ));
            }
        }
    }

    if config.schedule.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "schedule.interval_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
