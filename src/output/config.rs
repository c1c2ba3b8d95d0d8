use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        Self::parse(
            env::var("COURSE_FEED_OUTPUT_FORMAT").ok().as_deref(),
            env::var("COURSE_FEED_OUTPUT_PRETTY").ok().as_deref(),
        )
    }

    // Envelopes are JSON unless text is asked for explicitly.
    fn parse(format: Option<&str>, pretty: Option<&str>) -> Self {
        let format = match format {
            Some(v) if v.eq_ignore_ascii_case("text") => OutputFormat::Text,
            _ => OutputFormat::Json,
        };
        let pretty = matches!(pretty, Some(v) if v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"));
        OutputConfig { format, pretty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_the_default() {
        assert_eq!(OutputConfig::parse(None, None), OutputConfig { format: OutputFormat::Json, pretty: false });
        assert_eq!(OutputConfig::parse(Some("TEXT"), Some("yes")), OutputConfig { format: OutputFormat::Text, pretty: true });
        assert_eq!(OutputConfig::parse(Some("xml"), Some("0")).format, OutputFormat::Json);
    }
}
