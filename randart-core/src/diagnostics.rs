/// What ran out of budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum WarningKind {
    BaseChoice,
    Balance,
    Curse,
    SetAcceptance,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    /// Artifact index, or `None` for set-level warnings.
    pub index: Option<usize>,
    pub kind: WarningKind,
    pub message: String,
}

/// Spoiler/diagnostic text for one session plus the warnings raised while
/// generating. Text is only accumulated when enabled; warnings always are.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticLog {
    enabled: bool,
    text: String,
    warnings: Vec<Warning>,
}

impl DiagnosticLog {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn line(&mut self, s: &str) {
        if self.enabled {
            self.text.push_str(s);
            self.text.push('\n');
        }
    }

    pub fn warn(&mut self, index: Option<usize>, kind: WarningKind, message: String) {
        match index {
            Some(idx) => tracing::warn!(index = idx, %kind, "{message}"),
            None => tracing::warn!(%kind, "{message}"),
        }
        if self.enabled {
            match index {
                Some(idx) => self
                    .text
                    .push_str(&format!("WARNING [{idx}] {kind}: {message}\n")),
                None => self.text.push_str(&format!("WARNING {kind}: {message}\n")),
            }
        }
        self.warnings.push(Warning {
            index,
            kind,
            message,
        });
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warning(&self, index: usize, kind: WarningKind) -> bool {
        self.warnings
            .iter()
            .any(|w| w.index == Some(index) && w.kind == kind)
    }

    /// Drop per-item warnings from an abandoned pass, keeping set-level ones.
    pub fn clear_item_warnings(&mut self) {
        self.warnings.retain(|w| w.index.is_none());
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
