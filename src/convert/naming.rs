use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

const TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year][month][day]_[hour][minute][second]");

/// How artifact names are built from (table, year).
///
/// `{year}` inside the prefix or suffix template is substituted with the
/// job's year. The timestamp is a pre-rendered string captured once per
/// batch run, which keeps [`artifact_stem`] a pure function.
#[derive(Debug, Clone, Default)]
pub struct NamingConfig {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub lowercase: bool,
    pub replace_whitespace: bool,
    pub sanitize: bool,
    pub timestamp: Option<String>,
}

/// Deterministic artifact stem for one (table, year) job.
///
/// The format extension is appended later by the writer layer. With no
/// prefix configured the stem defaults to `{table}-{year}`.
pub fn artifact_stem(table: &str, year: i32, config: &NamingConfig) -> String {
    let year_text = year.to_string();
    let name = if config.lowercase {
        table.to_lowercase()
    } else {
        table.to_string()
    };

    let mut stem = match &config.prefix {
        Some(prefix) => format!("{}{name}", prefix.replace("{year}", &year_text)),
        None => format!("{name}-{year_text}"),
    };
    if let Some(suffix) = &config.suffix {
        stem.push_str(&suffix.replace("{year}", &year_text));
    }
    if let Some(timestamp) = &config.timestamp {
        stem.push('_');
        stem.push_str(timestamp);
    }
    if config.replace_whitespace {
        stem = stem
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
    }
    if config.sanitize {
        stem.retain(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    }
    stem
}

/// Rendered once at batch start and stored in [`NamingConfig::timestamp`].
pub fn timestamp_suffix() -> String {
    OffsetDateTime::now_utc()
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stem() {
        let config = NamingConfig::default();
        assert_eq!(artifact_stem("SALES", 2008, &config), "SALES-2008");
    }

    #[test]
    fn test_prefix_template_with_lowercase() {
        let config = NamingConfig {
            prefix: Some("hist-{year}-".to_string()),
            lowercase: true,
            ..NamingConfig::default()
        };
        assert_eq!(artifact_stem("Sales", 2020, &config), "hist-2020-sales");
    }

    #[test]
    fn test_suffix_template() {
        let config = NamingConfig {
            suffix: Some("_y{year}".to_string()),
            ..NamingConfig::default()
        };
        assert_eq!(artifact_stem("SALES", 2008, &config), "SALES-2008_y2008");
    }

    #[test]
    fn test_whitespace_and_sanitize() {
        let config = NamingConfig {
            replace_whitespace: true,
            sanitize: true,
            ..NamingConfig::default()
        };
        assert_eq!(
            artifact_stem("Venta Año", 2010, &config),
            "Venta_Ao-2010"
        );
    }

    #[test]
    fn test_stem_is_deterministic_and_distinct() {
        let config = NamingConfig {
            prefix: Some("x-{year}-".to_string()),
            timestamp: Some("20260807_120000".to_string()),
            ..NamingConfig::default()
        };
        let a = artifact_stem("T1", 2008, &config);
        let b = artifact_stem("T1", 2008, &config);
        assert_eq!(a, b);
        assert_ne!(
            artifact_stem("T1", 2008, &config),
            artifact_stem("T1", 2009, &config)
        );
        assert_ne!(
            artifact_stem("T1", 2008, &config),
            artifact_stem("T2", 2008, &config)
        );
    }
}
