/// Crate version reported in the user-agent string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_PLUGIN: &str = "tempo-v0/";

/// Build the user-agent string sent with every heartbeat:
/// `tempo/<version> (<os>-<arch>) <plugin>`.
pub fn user_agent(plugin: &str) -> String {
    let plugin = if plugin.trim().is_empty() {
        DEFAULT_PLUGIN
    } else {
        plugin
    };
    format!(
        "tempo/{} ({}-{}) {}",
        VERSION,
        std::env::consts::OS,
        std::env::consts::ARCH,
        plugin.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plugin_falls_back_to_default() {
        let ua = user_agent("");
        assert!(ua.starts_with(&format!("tempo/{VERSION} (")));
        assert!(ua.ends_with("tempo-v0/"));
    }

    #[test]
    fn plugin_is_trimmed_and_appended() {
        let ua = user_agent("  vim-tempo/1.2.0 ");
        assert!(ua.ends_with("vim-tempo/1.2.0"));
    }
}
