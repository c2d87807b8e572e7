//! Strategy providers: presets and the interactive prompt.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{ConfigError, ImputeError, ImputeResult};
use crate::models::Strategy;

use super::impute::{StrategyProvider, StrategyRequest};

/// Strategies decided up front, per column, with an optional default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetStrategies {
    columns: HashMap<String, Strategy>,
    default: Option<Strategy>,
}

impl PresetStrategies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a column → strategy map.
    pub fn from_map(columns: HashMap<String, Strategy>) -> Self {
        Self {
            columns,
            default: None,
        }
    }

    /// Strategy used for columns without an explicit entry.
    pub fn with_default(mut self, default: Option<Strategy>) -> Self {
        self.default = default;
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, strategy: Strategy) {
        self.columns.insert(column.into(), strategy);
    }

    /// Parse `COLUMN=STRATEGY` assignments (as given on the command line).
    pub fn from_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<Self, ConfigError> {
        let mut presets = Self::new();
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (column, strategy) = assignment
                .rsplit_once('=')
                .ok_or_else(|| ConfigError::InvalidAssignment(assignment.to_string()))?;
            if column.trim().is_empty() {
                return Err(ConfigError::InvalidAssignment(assignment.to_string()));
            }
            presets.insert(column.trim(), strategy.parse()?);
        }
        Ok(presets)
    }

    /// Load a JSON object of `{"column": "strategy"}` pairs.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let columns: HashMap<String, Strategy> = serde_json::from_str(&content)?;
        Ok(Self::from_map(columns))
    }

    /// Entries of `other` take precedence; its default wins when set.
    pub fn merge(mut self, other: PresetStrategies) -> Self {
        self.columns.extend(other.columns);
        self.default = other.default.or(self.default);
        self
    }

    /// Strategy for `column`, falling back to its trimmed name, then the default.
    pub fn get(&self, column: &str) -> Option<Strategy> {
        self.columns
            .get(column)
            .or_else(|| self.columns.get(column.trim()))
            .copied()
            .or(self.default)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.default.is_none()
    }
}

impl StrategyProvider for PresetStrategies {
    fn choose(&mut self, request: &StrategyRequest<'_>) -> ImputeResult<Strategy> {
        self.get(request.column)
            .ok_or_else(|| ImputeError::NoStrategy(request.column.to_string()))
    }
}

/// Asks the user on a line-based terminal, after consulting presets.
pub struct PromptStrategies<R, W> {
    presets: PresetStrategies,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptStrategies<R, W> {
    pub fn new(presets: PresetStrategies, input: R, output: W) -> Self {
        Self {
            presets,
            input,
            output,
        }
    }

    fn ask(&mut self, request: &StrategyRequest<'_>) -> std::io::Result<Option<Strategy>> {
        writeln!(
            self.output,
            "\nWe have noticed that you have null values in your {} column ({} of {} rows)",
            request.column, request.missing, request.rows
        )?;

        loop {
            writeln!(
                self.output,
                "How would you like to handle null values in {}?",
                request.column
            )?;
            for (i, strategy) in Strategy::ALL.iter().enumerate() {
                writeln!(self.output, "  {}) {}", i + 1, strategy)?;
            }
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            match line.parse::<Strategy>() {
                Ok(strategy) => return Ok(Some(strategy)),
                Err(_) => writeln!(
                    self.output,
                    "Please answer 1, 2 or 3 (or Mean, Median, Drop)."
                )?,
            }
        }
    }
}

impl<R: BufRead, W: Write> StrategyProvider for PromptStrategies<R, W> {
    fn choose(&mut self, request: &StrategyRequest<'_>) -> ImputeResult<Strategy> {
        if let Some(strategy) = self.presets.get(request.column) {
            return Ok(strategy);
        }

        match self.ask(request) {
            Ok(Some(strategy)) => Ok(strategy),
            Ok(None) => Err(ImputeError::Provider(format!(
                "input closed before a strategy was chosen for column '{}'",
                request.column
            ))),
            Err(e) => Err(ImputeError::Provider(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn request(column: &str) -> StrategyRequest<'_> {
        StrategyRequest {
            column,
            missing: 2,
            rows: 10,
        }
    }

    #[test]
    fn test_presets_with_default() {
        let mut presets = PresetStrategies::from_assignments(&["age=median", "score=Drop"])
            .unwrap()
            .with_default(Some(Strategy::Mean));

        assert_eq!(presets.choose(&request("age")).unwrap(), Strategy::Median);
        assert_eq!(presets.choose(&request("score")).unwrap(), Strategy::Drop);
        assert_eq!(presets.choose(&request("other")).unwrap(), Strategy::Mean);
    }

    #[test]
    fn test_presets_without_default_fail() {
        let mut presets = PresetStrategies::new();
        assert_eq!(
            presets.choose(&request("age")),
            Err(ImputeError::NoStrategy("age".into()))
        );
    }

    #[test]
    fn test_padded_column_matches_trimmed_preset() {
        let presets = PresetStrategies::from_assignments(&["age=drop"]).unwrap();
        assert_eq!(presets.get(" age "), Some(Strategy::Drop));
        assert_eq!(presets.get("ages"), None);
    }

    #[test]
    fn test_invalid_assignments() {
        assert!(matches!(
            PresetStrategies::from_assignments(&["age"]),
            Err(ConfigError::InvalidAssignment(_))
        ));
        assert!(matches!(
            PresetStrategies::from_assignments(&["=mean"]),
            Err(ConfigError::InvalidAssignment(_))
        ));
        assert!(matches!(
            PresetStrategies::from_assignments(&["age=mode"]),
            Err(ConfigError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_column_name_with_equals_sign() {
        let presets = PresetStrategies::from_assignments(&["a=b=drop"]).unwrap();
        assert_eq!(presets.get("a=b"), Some(Strategy::Drop));
    }

    #[test]
    fn test_json_file_and_merge() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"age": "Median", "income": "drop"}}"#).unwrap();

        let from_file = PresetStrategies::from_json_file(file.path()).unwrap();
        let flags = PresetStrategies::from_assignments(&["age=mean"]).unwrap();
        let merged = from_file.merge(flags);

        assert_eq!(merged.get("age"), Some(Strategy::Mean));
        assert_eq!(merged.get("income"), Some(Strategy::Drop));
        assert_eq!(merged.get("other"), None);
    }

    #[test]
    fn test_prompt_accepts_number_and_label() {
        let input = Cursor::new("2\nDrop these entries\n");
        let mut output = Vec::new();
        let mut prompt = PromptStrategies::new(PresetStrategies::new(), input, &mut output);

        assert_eq!(prompt.choose(&request("age")).unwrap(), Strategy::Median);
        assert_eq!(prompt.choose(&request("score")).unwrap(), Strategy::Drop);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("null values in your age column"));
        assert!(shown.contains("How would you like to handle null values in score?"));
        assert!(shown.contains("3) Drop these entries"));
    }

    #[test]
    fn test_prompt_reasks_on_invalid_answer() {
        let input = Cursor::new("mode\n\nmean\n");
        let mut output = Vec::new();
        let mut prompt = PromptStrategies::new(PresetStrategies::new(), input, &mut output);

        assert_eq!(prompt.choose(&request("age")).unwrap(), Strategy::Mean);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Please answer").count(), 2);
    }

    #[test]
    fn test_prompt_eof_is_error() {
        let mut prompt =
            PromptStrategies::new(PresetStrategies::new(), Cursor::new(""), Vec::new());
        assert!(matches!(
            prompt.choose(&request("age")),
            Err(ImputeError::Provider(_))
        ));
    }

    #[test]
    fn test_prompt_uses_presets_first() {
        let presets = PresetStrategies::from_assignments(&["age=drop"]).unwrap();
        let mut output = Vec::new();
        let mut prompt = PromptStrategies::new(presets, Cursor::new(""), &mut output);

        assert_eq!(prompt.choose(&request("age")).unwrap(), Strategy::Drop);
        assert!(output.is_empty());
    }
}
