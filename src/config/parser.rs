use crate::config::types::Profile;
use crate::ConfigError;
use std::path::{Path, PathBuf};
use url::Url;

const PROFILE_PREFIX: &str = "config_";
const PROFILE_EXTENSION: &str = "toml";

/// Loads a profile from a TOML file
///
/// The profile is only parsed here; call [`Profile::to_crawl_config`] to validate it.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use pdf_harvest::config::load_profile;
///
/// let profile = load_profile(Path::new("config_city.toml")).unwrap();
/// println!("Base URL: {}", profile.base_url);
/// ```
pub fn load_profile(path: &Path) -> Result<Profile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let profile: Profile = toml::from_str(&content)?;
    Ok(profile)
}

/// Writes a profile into `dir` as `config_<site>.toml` and returns the path written
pub fn save_profile(profile: &Profile, dir: &Path) -> Result<PathBuf, ConfigError> {
    let path = dir.join(profile_file_name(&profile.base_url)?);
    let content = toml::to_string_pretty(profile)?;

    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, content)?;

    tracing::info!("Profile saved to {}", path.display());
    Ok(path)
}

/// Lists the profile files in `dir`, sorted by name
pub fn list_profiles(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut profiles = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if is_profile_file(&path) {
            profiles.push(path);
        }
    }

    profiles.sort();
    Ok(profiles)
}

/// Human-readable profile name: the file name without prefix and extension
pub fn profile_display_name(path: &Path) -> Option<&str> {
    path.file_stem()?.to_str()?.strip_prefix(PROFILE_PREFIX)
}

fn profile_file_name(base_url: &str) -> Result<String, ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base URL '{}': {}", base_url, e)))?;
    let stem = crate::url::site_stem(&url)
        .ok_or_else(|| ConfigError::InvalidUrl(format!("Base URL '{}' has no host", base_url)))?;

    Ok(format!("{}{}.{}", PROFILE_PREFIX, stem, PROFILE_EXTENSION))
}

fn is_profile_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().and_then(|e| e.to_str()) == Some(PROFILE_EXTENSION)
        && profile_display_name(path).is_some_and(|name| !name.is_empty())
}
