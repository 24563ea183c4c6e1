//! Release coordinates and downloaded package contents.

use super::extraction::ArchiveFormat;
use crate::config::DriverConfig;
use crate::platform::Platform;
use crate::version::VersionSpec;

/// Where one version of the driver can be downloaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// The version being fetched.
    pub version: VersionSpec,
    /// Rendered archive URL.
    pub url: String,
    /// Rendered checksum URL, when the configuration names one.
    pub checksum_url: Option<String>,
    /// The release host's name for the platform.
    pub platform_token: String,
}

/// One file decoded from a release archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Path inside the archive, `/`-separated.
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
    /// Unix permission bits recorded in the archive, if any.
    pub mode: Option<u32>,
}

impl PackageEntry {
    /// The final path component of [`PackageEntry::name`].
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.name.as_str())
    }
}

/// A downloaded and decoded release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// The release the entries came from.
    pub release: Release,
    /// How the download was encoded.
    pub format: ArchiveFormat,
    /// Regular files found in the download.
    pub entries: Vec<PackageEntry>,
}

/// Builds [`Release`] coordinates from the driver configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseLocator<'a> {
    config: &'a DriverConfig,
    platform_token: &'a str,
}

impl<'a> ReleaseLocator<'a> {
    /// A locator for `platform`, or `None` when the configuration does not
    /// serve it.
    #[must_use]
    pub fn new(config: &'a DriverConfig, platform: &Platform) -> Option<Self> {
        config
            .platform_token(platform)
            .map(|platform_token| Self {
                config,
                platform_token,
            })
    }

    /// The release of `version`.
    #[must_use]
    pub fn locate(&self, version: &VersionSpec) -> Release {
        let render = |template: &str| {
            self.config
                .render(template, version.as_str(), self.platform_token)
        };
        Release {
            version: version.clone(),
            url: render(&self.config.download_url),
            checksum_url: self.config.checksum_url.as_deref().map(render),
            platform_token: self.platform_token.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8Path;
    use rstest::rstest;

    fn config(extra: &str) -> DriverConfig {
        let text = format!(
            "name = \"geckodriver\"\n\
             download-url = \"https://host/v{{version}}/{{name}}-v{{version}}-{{platform}}.tar.gz\"\n\
             {extra}\n\
             [platforms]\n\
             linux-x86_64 = \"linux64\"\n"
        );
        DriverConfig::parse(&text, Utf8Path::new("webdriver.toml")).expect("valid configuration")
    }

    #[test]
    fn renders_download_and_checksum_urls() {
        let config = config("checksum-url = \"https://host/v{version}/{platform}.sha256\"");
        let locator = ReleaseLocator::new(&config, &Platform::from_parts("linux", "x86_64"))
            .expect("linux is served");
        let release = locator.locate(&VersionSpec::new("0.34.0"));

        assert_eq!(
            release.url,
            "https://host/v0.34.0/geckodriver-v0.34.0-linux64.tar.gz"
        );
        assert_eq!(
            release.checksum_url.as_deref(),
            Some("https://host/v0.34.0/linux64.sha256")
        );
        assert_eq!(release.platform_token, "linux64");
    }

    #[test]
    fn unserved_platform_has_no_locator() {
        let config = config("");
        assert!(ReleaseLocator::new(&config, &Platform::from_parts("windows", "x86")).is_none());
    }

    #[rstest]
    #[case::nested("geckodriver-v0.34/bin/geckodriver", "geckodriver")]
    #[case::flat("chromedriver.exe", "chromedriver.exe")]
    #[case::windows_separator("dir\\chromedriver.exe", "chromedriver.exe")]
    fn entry_file_name_is_last_component(#[case] name: &str, #[case] expected: &str) {
        let entry = PackageEntry {
            name: name.to_owned(),
            bytes: Vec::new(),
            mode: None,
        };
        assert_eq!(entry.file_name(), expected);
    }
}
