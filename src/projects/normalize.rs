use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(py|ts|js|rs)$").expect("valid extension regex"));
static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]").expect("valid slug regex"));
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("valid dash regex"));

/// Maps free-form project names onto a stable slug.
///
/// Aliases are matched on the trimmed, lower-cased name before any
/// punctuation rewriting, so an alias key may itself contain punctuation.
/// Alias keys are trimmed and lower-cased too, so `"HotBits"` and
/// `"hotbits"` configure the same alias.
#[derive(Debug, Clone, Default)]
pub(crate) struct Normalizer {
    aliases: HashMap<String, String>,
    org_prefixes: Vec<String>,
}

impl Normalizer {
    pub(crate) fn new(aliases: HashMap<String, String>, org_prefixes: Vec<String>) -> Self {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v))
                .collect(),
            org_prefixes: org_prefixes
                .into_iter()
                .map(|p| p.trim().trim_end_matches('/').to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub(crate) fn normalize(&self, name: &str) -> String {
        let name = name.trim().to_lowercase();
        if let Some(canonical) = self.aliases.get(&name) {
            return canonical.clone();
        }

        let mut rest = name.as_str();
        for org in &self.org_prefixes {
            if let Some(stripped) = rest
                .strip_prefix(org.as_str())
                .and_then(|s| s.strip_prefix('/'))
            {
                rest = stripped;
                break;
            }
        }

        let rest = EXTENSION.replace(rest, "");
        let rest = NON_SLUG.replace_all(&rest, "-");
        let rest = DASHES.replace_all(&rest, "-");
        rest.trim_matches('-').to_string()
    }
}
