//! Build version and git metadata.

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git branch at build time, or "unknown" outside a checkout.
pub const GIT_BRANCH: &str = match option_env!("VERGEN_GIT_BRANCH") {
    Some(branch) => branch,
    None => "unknown",
};

/// Git commit SHA at build time, or "unknown" outside a checkout.
pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

fn git_dirty() -> bool {
    option_env!("VERGEN_GIT_DIRTY") == Some("true")
}

/// `{version}+{branch}.{sha7}`, with a `.dirty` suffix for unclean trees.
pub fn version_string() -> String {
    let dirty_suffix = if git_dirty() { ".dirty" } else { "" };
    format!(
        "{PKG_VERSION}+{GIT_BRANCH}.{}{dirty_suffix}",
        &GIT_SHA[..7.min(GIT_SHA.len())]
    )
}

/// `User-Agent` sent to the AI service.
pub fn user_agent() -> String {
    format!("huginn/{PKG_VERSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_pkg_version() {
        assert!(version_string().starts_with(PKG_VERSION));
    }

    #[test]
    fn version_string_carries_branch() {
        assert!(version_string().contains(GIT_BRANCH));
    }

    #[test]
    fn user_agent_names_crate() {
        assert_eq!(user_agent(), format!("huginn/{PKG_VERSION}"));
    }
}
