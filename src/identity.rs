use std::sync::OnceLock;

use semver::Version;

pub const FALLBACK_NAME: &str = "YouTube Video Downloader";
pub const PROJECT_URL: &str = "https://github.com/zackmarzt/YouTubeDownloader-Copy";
const LATEST_RELEASE_PATH: &str = "/releases/latest";

/// Name, version and links of the running build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub name: String,
    pub version: Version,
    pub version_string: String,
    pub project_url: String,
    pub latest_release_url: String,
}

static IDENTITY: OnceLock<AppIdentity> = OnceLock::new();

/// Identity resolved from the metadata compiled into this binary.
/// Computed on first access and shared for the rest of the process.
pub fn current() -> &'static AppIdentity {
    IDENTITY.get_or_init(|| {
        AppIdentity::from_metadata(option_env!("CARGO_PKG_NAME"), option_env!("CARGO_PKG_VERSION"))
    })
}

impl AppIdentity {
    pub fn from_metadata(name: Option<&str>, version: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_NAME)
            .to_string();
        let version = version.and_then(parse_version).unwrap_or_else(|| Version::new(0, 0, 0));

        Self {
            name,
            version_string: format!("{}.{}.{}", version.major, version.minor, version.patch),
            version,
            project_url: PROJECT_URL.to_string(),
            latest_release_url: latest_release_url(PROJECT_URL),
        }
    }
}

pub fn latest_release_url(project_url: &str) -> String {
    format!("{}{}", project_url.trim_end_matches('/'), LATEST_RELEASE_PATH)
}

// Accepts strict semver as well as dotted versions with fewer or more than three
// numeric components. Anything beyond major.minor.patch is dropped.
fn parse_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    if let Ok(version) = Version::parse(raw) {
        return Some(Version::new(version.major, version.minor, version.patch));
    }

    let core = raw.split(['-', '+']).next()?;
    let mut components = [0u64; 3];
    // An empty core still yields one empty part, which fails to parse.
    for (index, part) in core.split('.').enumerate() {
        let value = part.parse::<u64>().ok()?;
        if index < components.len() {
            components[index] = value;
        }
    }

    Some(Version::new(components[0], components[1], components[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_comes_from_metadata_when_present() {
        let identity = AppIdentity::from_metadata(Some("YoutubeDownloader"), Some("1.0.0"));
        assert_eq!(identity.name, "YoutubeDownloader");
    }

    #[test]
    fn missing_or_blank_name_falls_back_to_product_name() {
        assert_eq!(AppIdentity::from_metadata(None, None).name, FALLBACK_NAME);
        assert_eq!(AppIdentity::from_metadata(Some("  "), None).name, FALLBACK_NAME);
    }

    #[test]
    fn missing_or_malformed_version_resolves_to_zero() {
        let identity = AppIdentity::from_metadata(None, None);
        assert_eq!(identity.version, Version::new(0, 0, 0));
        assert_eq!(identity.version_string, "0.0.0");

        let identity = AppIdentity::from_metadata(None, Some("not-a-version"));
        assert_eq!(identity.version_string, "0.0.0");
    }

    #[test]
    fn version_string_always_has_three_components() {
        let cases = [
            ("2.5.1", "2.5.1"),
            ("1.2.3.4", "1.2.3"),
            ("7", "7.0.0"),
            ("3.1", "3.1.0"),
            ("1.4.0-beta.2+build.9", "1.4.0"),
        ];
        for (raw, expected) in cases {
            let identity = AppIdentity::from_metadata(None, Some(raw));
            assert_eq!(identity.version_string, expected, "version {raw}");
            assert_eq!(identity.version_string.split('.').count(), 3);
        }
    }

    #[test]
    fn empty_or_dangling_components_are_rejected() {
        for raw in ["", "   ", "-beta", "+build", ".", "1.", "1..2"] {
            assert_eq!(parse_version(raw), None, "version {raw:?}");
        }
    }

    #[test]
    fn latest_release_url_appends_path_without_doubling_separator() {
        assert_eq!(
            latest_release_url("https://github.com/owner/repo"),
            "https://github.com/owner/repo/releases/latest"
        );
        assert_eq!(
            latest_release_url("https://github.com/owner/repo/"),
            "https://github.com/owner/repo/releases/latest"
        );

        let identity = AppIdentity::from_metadata(None, None);
        assert_eq!(
            identity.latest_release_url,
            format!("{}/releases/latest", identity.project_url)
        );
    }

    #[test]
    fn current_identity_is_stable() {
        let first = current();
        let second = current();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.name, env!("CARGO_PKG_NAME"));
    }
}
