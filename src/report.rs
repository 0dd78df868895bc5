use anyhow::{Result, bail};

pub const NO_REPORT_NOTICE: &str = "No AI report was generated. Please try again.";
pub const RAW_REPORT_TITLE: &str = "AI Report (Raw)";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSpan {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub heading: bool,
}

impl ReportSpan {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

pub type ReportLine = Vec<ReportSpan>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReportBody {
    #[default]
    Empty,
    Formatted(Vec<ReportLine>),
    Raw(String),
    NoReport,
}

/// AI report pane. The toggle label is derived from `visible`, so the two cannot drift apart.
#[derive(Debug, Clone, Default)]
pub struct ReportPanel {
    pub body: ReportBody,
    pub visible: bool,
}

impl ReportPanel {
    pub fn render(&mut self, text: &str) {
        self.body = render_report(text);
        self.visible = true;
    }

    pub fn clear_and_hide(&mut self) {
        self.body = ReportBody::Empty;
        self.visible = false;
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.visible {
            "Hide AI Report"
        } else {
            "Show AI Report"
        }
    }

    /// Screen lines the body takes once wrapped at `width` columns.
    pub fn wrapped_line_count(&self, width: usize) -> usize {
        let rows = |chars: usize| -> usize {
            if width == 0 {
                1
            } else {
                chars.div_ceil(width).max(1)
            }
        };
        match &self.body {
            ReportBody::Empty => 0,
            ReportBody::NoReport => rows(NO_REPORT_NOTICE.chars().count()),
            ReportBody::Raw(raw) => raw.lines().map(|line| rows(line.chars().count())).sum(),
            ReportBody::Formatted(lines) => lines
                .iter()
                .map(|line| rows(line_text(line).chars().count()))
                .sum(),
        }
    }
}

pub fn render_report(text: &str) -> ReportBody {
    if text.trim().is_empty() {
        return ReportBody::NoReport;
    }
    match format_report(text) {
        Ok(lines) => ReportBody::Formatted(lines),
        Err(_) => ReportBody::Raw(text.to_string()),
    }
}

#[cfg(feature = "markdown")]
fn format_report(text: &str) -> Result<Vec<ReportLine>> {
    ensure_visible(markdown_lines(text))
}

#[cfg(not(feature = "markdown"))]
fn format_report(text: &str) -> Result<Vec<ReportLine>> {
    ensure_visible(fallback_lines(text))
}

fn ensure_visible(lines: Vec<ReportLine>) -> Result<Vec<ReportLine>> {
    let visible = lines
        .iter()
        .flatten()
        .any(|span| !span.text.trim().is_empty());
    if !visible {
        bail!("report formatting produced no visible text");
    }
    Ok(lines)
}

/// Minimal formatting used without the markdown renderer: line breaks, `**bold**`, `*italic*`.
pub fn fallback_lines(text: &str) -> Vec<ReportLine> {
    text.split('\n')
        .map(|line| fallback_line(line.trim_end_matches('\r')))
        .collect()
}

fn fallback_line(line: &str) -> ReportLine {
    let mut spans: ReportLine = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**")
            && let Some(end) = after.find("**")
            && end > 0
        {
            flush_plain(&mut spans, &mut plain);
            spans.push(ReportSpan {
                text: after[..end].to_string(),
                bold: true,
                ..ReportSpan::default()
            });
            rest = &after[end + 2..];
            continue;
        }
        if let Some(after) = rest.strip_prefix('*')
            && let Some(end) = after.find('*')
            && end > 0
        {
            flush_plain(&mut spans, &mut plain);
            spans.push(ReportSpan {
                text: after[..end].to_string(),
                italic: true,
                ..ReportSpan::default()
            });
            rest = &after[end + 1..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            plain.push(ch);
        }
        rest = chars.as_str();
    }
    flush_plain(&mut spans, &mut plain);
    spans
}

fn flush_plain(spans: &mut ReportLine, plain: &mut String) {
    if !plain.is_empty() {
        spans.push(ReportSpan::plain(std::mem::take(plain)));
    }
}

#[cfg(feature = "markdown")]
pub fn markdown_lines(text: &str) -> Vec<ReportLine> {
    use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

    let mut lines: Vec<ReportLine> = Vec::new();
    let mut current: ReportLine = Vec::new();
    let mut bold = 0usize;
    let mut italic = 0usize;
    let mut heading = false;
    let mut code_block = false;
    let mut list_depth = 0usize;

    let push_line = |lines: &mut Vec<ReportLine>, current: &mut ReportLine| {
        lines.push(std::mem::take(current));
    };
    let push_blank = |lines: &mut Vec<ReportLine>| {
        if lines.last().is_some_and(|line| !line.is_empty()) {
            lines.push(Vec::new());
        }
    };

    for event in Parser::new_ext(text, Options::empty()) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Strong => bold += 1,
                Tag::Emphasis => italic += 1,
                Tag::Heading { .. } => heading = true,
                Tag::CodeBlock(_) => code_block = true,
                Tag::List(_) => list_depth += 1,
                Tag::Item => {
                    let indent = "  ".repeat(list_depth.saturating_sub(1));
                    current.push(ReportSpan::plain(format!("{indent}• ")));
                }
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Strong => bold = bold.saturating_sub(1),
                TagEnd::Emphasis => italic = italic.saturating_sub(1),
                TagEnd::Heading(_) => {
                    heading = false;
                    push_line(&mut lines, &mut current);
                    push_blank(&mut lines);
                }
                TagEnd::Paragraph => {
                    push_line(&mut lines, &mut current);
                    if list_depth == 0 {
                        push_blank(&mut lines);
                    }
                }
                TagEnd::Item => {
                    if !current.is_empty() {
                        push_line(&mut lines, &mut current);
                    }
                }
                TagEnd::List(_) => {
                    list_depth = list_depth.saturating_sub(1);
                    if list_depth == 0 {
                        push_blank(&mut lines);
                    }
                }
                TagEnd::CodeBlock => {
                    code_block = false;
                    if !current.is_empty() {
                        push_line(&mut lines, &mut current);
                    }
                    push_blank(&mut lines);
                }
                _ => {}
            },
            Event::Text(body) => {
                if code_block {
                    let mut parts = body.split('\n').peekable();
                    while let Some(part) = parts.next() {
                        if !part.is_empty() {
                            current.push(ReportSpan {
                                text: part.to_string(),
                                code: true,
                                ..ReportSpan::default()
                            });
                        }
                        if parts.peek().is_some() {
                            push_line(&mut lines, &mut current);
                        }
                    }
                } else {
                    current.push(ReportSpan {
                        text: body.to_string(),
                        bold: bold > 0,
                        italic: italic > 0,
                        code: false,
                        heading,
                    });
                }
            }
            Event::Code(body) => current.push(ReportSpan {
                text: body.to_string(),
                code: true,
                ..ReportSpan::default()
            }),
            Event::SoftBreak | Event::HardBreak => push_line(&mut lines, &mut current),
            Event::Rule => {
                push_line(&mut lines, &mut current);
                lines.push(vec![ReportSpan::plain("────────")]);
            }
            _ => {}
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    // A leading empty line can be left behind when a block opens with a break.
    while lines.first().is_some_and(|line| line.is_empty()) {
        lines.remove(0);
    }
    lines
}

pub fn line_text(line: &ReportLine) -> String {
    line.iter().map(|span| span.text.as_str()).collect()
}
