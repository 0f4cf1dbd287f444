//! Token lists built up while reading the config files.
//!
//! Both lists keep normalized tokens and only produce the engine's
//! comma-separated form when rendered, so separators can never pile up.

/// Port specs collected from the bad-ports file or an inline entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortList {
    tokens: Vec<String>,
}

impl PortList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated port spec such as `22,80,8000-8100`.
    pub fn parse(spec: &str) -> Self {
        let mut list = Self::new();
        list.append(spec);
        list
    }

    /// Appends one raw line; empty fields between separators are dropped.
    pub fn append(&mut self, raw: &str) {
        self.tokens.extend(
            raw.split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The accumulated form, one trailing separator when non-empty.
    pub fn render(&self) -> String {
        render_accumulated(&self.tokens)
    }

    /// The form passed to the engine's `-p` flag.
    pub fn to_arg(&self) -> String {
        self.tokens.join(",")
    }
}

/// Targets to exclude from every scan unit of a business unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    exprs: Vec<String>,
}

impl ExclusionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, expr: &str) {
        let expr = expr.trim();
        if !expr.is_empty() {
            self.exprs.push(expr.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn exprs(&self) -> &[String] {
        &self.exprs
    }

    pub fn render(&self) -> String {
        render_accumulated(&self.exprs)
    }

    /// The form passed to the engine's `--exclude` flag.
    pub fn to_arg(&self) -> String {
        self.exprs.join(",")
    }
}

fn render_accumulated(tokens: &[String]) -> String {
    tokens.iter().map(|t| format!("{t},")).collect()
}
