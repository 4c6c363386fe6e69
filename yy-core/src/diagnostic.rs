/// Renders `message` with the source line `offset` points into and a caret
/// under the offending column.
pub fn pretty_error(source: &str, offset: Option<usize>, message: &str) -> String {
    let Some(before) = offset.and_then(|offset| source.get(..offset.min(source.len()))) else {
        return format!("error: {}", message);
    };

    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
    let line_end = source[before.len()..]
        .find('\n')
        .map(|idx| before.len() + idx)
        .unwrap_or(source.len());
    let column = before[line_start..].chars().count();

    format!(
        "error: {}\n{:>3} | {}\n      {}^",
        message,
        line,
        &source[line_start..line_end],
        " ".repeat(column)
    )
}
