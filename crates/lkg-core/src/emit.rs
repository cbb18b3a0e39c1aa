use std::collections::BTreeSet;

use crate::synth::RequirementLine;

fn render_line(line: &RequirementLine) -> String {
    match &line.marker {
        Some(marker) => format!("{}=={}; {}", line.package, line.version, marker),
        None => format!("{}=={}", line.package, line.version),
    }
}

/// Render requirement lines into final output text: lexicographically
/// sorted, deduplicated, newline-joined, no trailing newline.
pub fn emit(lines: &[RequirementLine]) -> String {
    let rendered: BTreeSet<String> = lines.iter().map(render_line).collect();
    rendered.into_iter().collect::<Vec<_>>().join("\n")
}
