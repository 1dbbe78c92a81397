/// A structured `/** ... */` comment: free text followed by `@tag` lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocBlock {
    summary: Vec<String>,
    tags: Vec<(String, String)>,
}

impl DocBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append free text; multi-line text adds one line each.
    pub fn summary(mut self, text: &str) -> Self {
        self.summary.extend(text.lines().map(|line| line.trim_end().to_string()));
        self
    }

    /// Append `@name value`.
    pub fn tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((name.into(), value.into()));
        self
    }

    pub fn summary_text(&self) -> Option<String> {
        (!self.summary.is_empty()).then(|| self.summary.join("\n"))
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Value of the first `@name` tag.
    pub fn find_tag(&self, name: &str) -> Option<&str> {
        self.tags().find(|(tag, _)| *tag == name).map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.tags.is_empty()
    }

    /// Comment text, single-line when there is only one line to show.
    pub fn render(&self) -> Option<String> {
        let mut lines: Vec<String> = self.summary.clone();
        if !lines.is_empty() && !self.tags.is_empty() {
            lines.push(String::new());
        }
        lines.extend(self.tags.iter().map(|(name, value)| {
            if value.is_empty() {
                format!("@{name}")
            } else {
                format!("@{name} {value}")
            }
        }));

        match lines.as_slice() {
            [] => None,
            [line] => Some(format!("/** {line} */")),
            lines => {
                let mut out = String::from("/**\n");
                for line in lines {
                    if line.is_empty() {
                        out.push_str(" *\n");
                    } else {
                        out.push_str(" * ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                out.push_str(" */");
                Some(out)
            }
        }
    }

    /// Split comment text back into summary and tags.
    pub fn parse(doc: &str) -> Self {
        let inner = doc.trim();
        let inner = inner.strip_prefix("/**").unwrap_or(inner);
        let inner = inner.strip_suffix("*/").unwrap_or(inner);

        let mut block = Self::new();
        for line in inner.lines() {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line).trim();
            if let Some(tag) = line.strip_prefix('@') {
                let (name, value) = tag.split_once(char::is_whitespace).unwrap_or((tag, ""));
                block.tags.push((name.to_string(), value.trim().to_string()));
            } else if let Some((_, value)) = block.tags.last_mut() {
                if !line.is_empty() {
                    value.push(' ');
                    value.push_str(line);
                }
            } else {
                block.summary.push(line.to_string());
            }
        }

        while block.summary.last().is_some_and(String::is_empty) {
            block.summary.pop();
        }
        let leading = block.summary.iter().take_while(|line| line.is_empty()).count();
        block.summary.drain(..leading);
        block
    }
}
