// src/render/renderer.rs
use crate::check::{AdResult, StatusKind};

pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Danger,
    Warning,
    Success,
    Plain,
}

impl RowStyle {
    pub fn css_class(&self) -> Option<&'static str> {
        match self {
            RowStyle::Danger => Some("table-danger"),
            RowStyle::Warning => Some("table-warning"),
            RowStyle::Success => Some("table-success"),
            RowStyle::Plain => None,
        }
    }
}

impl From<StatusKind> for RowStyle {
    fn from(kind: StatusKind) -> Self {
        match kind {
            StatusKind::Disabled => RowStyle::Danger,
            StatusKind::Warning => RowStyle::Warning,
            StatusKind::Active => RowStyle::Success,
            StatusKind::Other => RowStyle::Plain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub style: RowStyle,
    /// Ad id, name, status, spend, conversions, reason.
    pub cells: [String; 6],
}

impl RenderedRow {
    fn from_result(result: &AdResult, kind: StatusKind) -> Self {
        Self {
            style: kind.into(),
            cells: [
                result.ad_id.clone(),
                text_or_placeholder(result.name.as_deref()),
                text_or_placeholder(Some(result.status.label())),
                result
                    .spend
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                result
                    .conversions
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                text_or_placeholder(result.reason.as_deref()),
            ],
        }
    }
}

fn text_or_placeholder(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Something that displays result rows. Each write replaces whatever the
/// target showed before.
pub trait RenderTarget {
    fn replace_rows(&mut self, rows: Vec<RenderedRow>);
}

pub struct ResultsRenderer;

impl ResultsRenderer {
    /// Project `results` into rows ordered disabled, warning, active, other,
    /// keeping input order within each group.
    pub fn rows(results: &[AdResult]) -> Vec<RenderedRow> {
        let mut tagged: Vec<(StatusKind, &AdResult)> = results
            .iter()
            .map(|result| (result.status.kind(), result))
            .collect();
        // stable sort keeps the input order inside a bucket
        tagged.sort_by_key(|(kind, _)| *kind);

        tagged
            .into_iter()
            .map(|(kind, result)| RenderedRow::from_result(result, kind))
            .collect()
    }

    pub fn render<T: RenderTarget + ?Sized>(results: &[AdResult], target: &mut T) {
        target.replace_rows(Self::rows(results));
    }
}
