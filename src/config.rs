use std::path::PathBuf;

pub const WORKSPACE_ENV: &str = "SCHOOLD_WORKSPACE";
pub const LOG_ENV: &str = "SCHOOLD_LOG";
const DEFAULT_LOG_FILTER: &str = "info";

/// Startup settings read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Workspace opened before the first request, as if `workspace.select` had run.
    pub workspace: Option<PathBuf>,
    /// `EnvFilter` directive for stderr logging.
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            workspace: non_blank(WORKSPACE_ENV).map(|v| PathBuf::from(v.trim())),
            log_filter: non_blank(LOG_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset_or_blank() {
        let vars: HashMap<&str, &str> = HashMap::from([(WORKSPACE_ENV, "  ")]);
        let cfg = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.workspace, None);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn reads_workspace_and_filter() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(WORKSPACE_ENV, "/srv/school"), (LOG_ENV, "schoold=debug")]);
        let cfg = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.workspace, Some(PathBuf::from("/srv/school")));
        assert_eq!(cfg.log_filter, "schoold=debug");
    }
}
