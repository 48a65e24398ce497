use std::env;
use std::process::Command;
use tracing::debug;

const UNKNOWN: &str = "Unknown";

/// Host facts the environment reader needs beyond what the PHP binary
/// can answer. Backed by process env vars in production; tests supply
/// a map so no real request context is required.
pub trait HostFacts {
    fn var(&self, name: &str) -> Option<String>;
}

pub struct EnvHostFacts;

impl HostFacts for EnvHostFacts {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.is_empty())
    }
}

/// Probes the local PHP installation by shelling out to its binary.
/// Every probe degrades to `None` or an empty list when the binary is
/// missing or misbehaves.
pub struct PhpCli {
    binary: String,
}

impl PhpCli {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    pub fn version(&self) -> Option<String> {
        let output = self.run(&["-r", "echo PHP_VERSION;"])?;
        let trimmed = output.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn ini_get(&self, name: &str) -> Option<String> {
        let script = format!("echo ini_get('{name}');");
        let output = self.run(&["-r", &script])?;
        let trimmed = output.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Loaded extension names, one per line of `php -m`, skipping the
    /// section headers the command prints.
    pub fn modules(&self) -> Vec<String> {
        let Some(output) = self.run(&["-m"]) else {
            return Vec::new();
        };
        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('['))
            .map(str::to_string)
            .collect()
    }

    fn run(&self, args: &[&str]) -> Option<String> {
        match Command::new(&self.binary).args(args).output() {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                debug!(binary = %self.binary, status = %output.status, "php probe exited non-zero");
                None
            }
            Err(err) => {
                debug!(binary = %self.binary, error = %err, "php probe failed to run");
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvironmentInfo {
    /// Label/value pairs in display order.
    pub entries: Vec<(String, String)>,
    pub extensions: Vec<String>,
}

/// Absent facts are never errors here: anything unreadable shows as
/// the literal `Unknown`.
pub fn read_environment_info(facts: &dyn HostFacts, php: &PhpCli) -> EnvironmentInfo {
    let extensions = php.modules();

    let entries = vec![
        ("PHP Version".to_string(), or_unknown(php.version())),
        (
            "Server Software".to_string(),
            or_unknown(facts.var("SERVER_SOFTWARE")),
        ),
        (
            "Document Root".to_string(),
            or_unknown(facts.var("DOCUMENT_ROOT")),
        ),
        ("Server OS".to_string(), env::consts::OS.to_string()),
        (
            "Server IP".to_string(),
            or_unknown(facts.var("SERVER_ADDR")),
        ),
        (
            "Max Upload Size".to_string(),
            or_unknown(php.ini_get("upload_max_filesize")),
        ),
        (
            "Max Post Size".to_string(),
            or_unknown(php.ini_get("post_max_size")),
        ),
        (
            "Memory Limit".to_string(),
            or_unknown(php.ini_get("memory_limit")),
        ),
        (
            "Max Execution Time".to_string(),
            php.ini_get("max_execution_time")
                .map(|value| format!("{value}s"))
                .unwrap_or_else(|| UNKNOWN.to_string()),
        ),
        (
            "PHP Modules".to_string(),
            format!("{} loaded", extensions.len()),
        ),
    ];

    EnvironmentInfo {
        entries,
        extensions,
    }
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapFacts(HashMap<&'static str, &'static str>);

    impl HostFacts for MapFacts {
        fn var(&self, name: &str) -> Option<String> {
            self.0.get(name).map(|value| value.to_string())
        }
    }

    fn missing_php() -> PhpCli {
        PhpCli::new("definitely-not-a-php-binary-8471")
    }

    #[test]
    fn missing_facts_substitute_unknown() {
        let info = read_environment_info(&MapFacts(HashMap::new()), &missing_php());
        let lookup: HashMap<_, _> = info.entries.iter().cloned().collect();
        assert_eq!(lookup["PHP Version"], "Unknown");
        assert_eq!(lookup["Server Software"], "Unknown");
        assert_eq!(lookup["Server IP"], "Unknown");
        assert_eq!(lookup["Memory Limit"], "Unknown");
        assert_eq!(lookup["PHP Modules"], "0 loaded");
        assert!(info.extensions.is_empty());
    }

    #[test]
    fn present_facts_are_passed_through() {
        let facts = MapFacts(HashMap::from([
            ("SERVER_SOFTWARE", "nginx/1.25"),
            ("DOCUMENT_ROOT", "/var/www"),
            ("SERVER_ADDR", "127.0.0.1"),
        ]));
        let info = read_environment_info(&facts, &missing_php());
        let lookup: HashMap<_, _> = info.entries.iter().cloned().collect();
        assert_eq!(lookup["Server Software"], "nginx/1.25");
        assert_eq!(lookup["Document Root"], "/var/www");
        assert_eq!(lookup["Server IP"], "127.0.0.1");
    }

    #[test]
    fn entries_keep_display_order() {
        let info = read_environment_info(&MapFacts(HashMap::new()), &missing_php());
        let labels: Vec<&str> = info.entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            labels,
            [
                "PHP Version",
                "Server Software",
                "Document Root",
                "Server OS",
                "Server IP",
                "Max Upload Size",
                "Max Post Size",
                "Memory Limit",
                "Max Execution Time",
                "PHP Modules",
            ]
        );
    }
}
