use log::info;
use serde::Serialize;

use crate::access::chain::ExtractionStrategy;

/// Which extraction strategies the host environment can run right now.
///
/// Environment capability does not change during a run, so callers cache
/// this per reader instance; a fresh reader re-probes.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySupport {
    pub supported: bool,
    pub available_strategies: Vec<String>,
    pub remediation: String,
}

pub(crate) fn probe_strategies(strategies: &[Box<dyn ExtractionStrategy>]) -> StrategySupport {
    let mut available = Vec::new();
    for strategy in strategies {
        match strategy.check() {
            Ok(()) => available.push(strategy.name().to_string()),
            Err(reason) => info!("strategy {} unavailable: {reason}", strategy.name()),
        }
    }
    let supported = !available.is_empty();
    let remediation = if supported {
        String::new()
    } else {
        no_support_message().to_string()
    };
    StrategySupport {
        supported,
        available_strategies: available,
        remediation,
    }
}

fn no_support_message() -> &'static str {
    if cfg!(target_os = "macos") {
        "no Access extraction tools found; install mdbtools (brew install mdbtools) \
         or convert the database manually"
    } else if cfg!(target_os = "windows") {
        "no Access extraction tools found; install mdbtools or register an Access \
         ODBC driver, or convert the database manually"
    } else {
        "no Access extraction tools found; install mdbtools (apt install mdbtools) \
         or register an Access ODBC driver"
    }
}
