/// Recording and flush configuration for a [`GpuContext`](super::GpuContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Run the merge pass before executing each op list.
    ///
    /// Disabling it changes the number of submissions, never the pixels.
    pub enable_merging: bool,

    /// How many surviving ops an op is offered to when merging.
    pub max_merge_lookback: usize,

    /// Run the drawing manager consistency check after every recorded op.
    pub validate: bool,

    /// Close an op list once it holds this many ops (0 = unbounded).
    pub max_ops_per_list: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            enable_merging: true,
            max_merge_lookback: 10,
            validate: cfg!(debug_assertions),
            max_ops_per_list: 0,
        }
    }
}

impl ContextOptions {
    /// Defaults overlaid with `MARDUK_GPU_DISABLE_MERGING`,
    /// `MARDUK_GPU_MERGE_LOOKBACK` and `MARDUK_GPU_VALIDATE`.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    fn overlay(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var("MARDUK_GPU_DISABLE_MERGING") {
            self.enable_merging = !parse_flag(&v);
        }
        if let Some(v) = var("MARDUK_GPU_MERGE_LOOKBACK") {
            match v.trim().parse() {
                Ok(n) => self.max_merge_lookback = n,
                Err(_) => log::warn!("ignoring MARDUK_GPU_MERGE_LOOKBACK={v:?}: not a number"),
            }
        }
        if let Some(v) = var("MARDUK_GPU_VALIDATE") {
            self.validate = parse_flag(&v);
        }
        self
    }
}

fn parse_flag(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn defaults() {
        let o = ContextOptions::default();
        assert!(o.enable_merging);
        assert_eq!(o.max_merge_lookback, 10);
        assert_eq!(o.max_ops_per_list, 0);
    }

    #[test]
    fn env_overlay() {
        let o = ContextOptions::default().overlay(env(&[
            ("MARDUK_GPU_DISABLE_MERGING", "true"),
            ("MARDUK_GPU_MERGE_LOOKBACK", "3"),
            ("MARDUK_GPU_VALIDATE", "0"),
        ]));
        assert!(!o.enable_merging);
        assert_eq!(o.max_merge_lookback, 3);
        assert!(!o.validate);
    }

    #[test]
    fn malformed_lookback_is_ignored() {
        let o = ContextOptions::default().overlay(env(&[("MARDUK_GPU_MERGE_LOOKBACK", "lots")]));
        assert_eq!(o.max_merge_lookback, 10);
    }
}
