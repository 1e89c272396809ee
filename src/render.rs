//! Text renderings of join paths.

use crate::model::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One `source(cols) -> destination(cols)` line per foreign key.
    #[default]
    Trace,
    /// A `FROM`-less SQL join chain.
    Joins,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "joins" | "sql" => Some(Self::Joins),
            _ => None,
        }
    }
}

/// Each foreign key on its own line, in path order.
pub fn render_trace(path: &Path) -> String {
    path.edges()
        .iter()
        .map(|edge| edge.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// The first edge's source table, then one `JOIN` clause per edge.
pub fn render_joins(path: &Path) -> String {
    let mut lines = vec![path.first_table()];
    lines.extend(path.edges().iter().map(|edge| edge.render_join()));
    lines.join("\n")
}

pub fn render(path: &Path, format: OutputFormat) -> String {
    match format {
        OutputFormat::Trace => render_trace(path),
        OutputFormat::Joins => render_joins(path),
    }
}

/// Render several paths, separated by a blank line.
pub fn render_all(paths: &[Path], format: OutputFormat) -> String {
    paths
        .iter()
        .map(|path| render(path, format))
        .collect::<Vec<_>>()
        .join("\n\n")
}
