use std::ffi::OsString;

use crate::identity::AppIdentity;

/// What the shell window shows besides the build identity.
#[derive(Debug, Default)]
pub struct ShellState {
    pub status: String,
    pub last_error: Option<String>,
    pub launch_args: Vec<OsString>,
}

impl ShellState {
    pub fn new(status: String, launch_args: Vec<OsString>) -> Self {
        Self {
            status,
            last_error: None,
            launch_args,
        }
    }

    pub fn record_error(&mut self, error: String) {
        self.last_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    ProjectPage,
    LatestRelease,
}

impl LinkTarget {
    pub fn label_key(self) -> &'static str {
        match self {
            Self::ProjectPage => "project-link",
            Self::LatestRelease => "latest-release-link",
        }
    }

    pub fn url(self, identity: &AppIdentity) -> &str {
        match self {
            Self::ProjectPage => &identity.project_url,
            Self::LatestRelease => &identity.latest_release_url,
        }
    }
}
