use std::env;

/// Hard ceiling the runtime imposes on actions per placed row.
pub const ROW_ACTION_CEILING: usize = 43;

/// Process-wide knobs, fetched once at startup and threaded as a value.
///
/// The compiler itself never reads the environment; the CLI (or a test)
/// builds a `Config` and passes it down.
#[derive(Debug, Clone)]
pub struct Config {
    /// Promote unresolved-line warnings to fail-fast errors.
    pub strict_unknown: bool,
    /// Print a single-line stderr warning per unresolved line.
    pub warn_unknown: bool,
    /// Per-row action budget before the closing-brace reservation.
    pub call_limit: usize,
    /// How many trampoline hops the auto-splitter may chain before
    /// giving up with a row-limit error.
    pub max_split_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict_unknown: false,
            warn_unknown: false,
            call_limit: ROW_ACTION_CEILING,
            max_split_depth: 64,
        }
    }
}

impl Config {
    /// Reads `MLDSL_STRICT_UNKNOWN`, `MLDSL_WARN_UNKNOWN` and
    /// `MLDSL_NORMALIZED_CALL_LIMIT` from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            strict_unknown: env_flag("MLDSL_STRICT_UNKNOWN"),
            warn_unknown: env_flag("MLDSL_WARN_UNKNOWN"),
            call_limit: env::var("MLDSL_NORMALIZED_CALL_LIMIT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.call_limit),
            max_split_depth: defaults.max_split_depth,
        }
    }
}

fn env_flag(name: &str) -> bool {
    matches!(env::var(name).as_deref(), Ok("1" | "true" | "yes"))
}
