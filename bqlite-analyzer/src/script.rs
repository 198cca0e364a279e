//! Splits a multi-statement script into individual statement texts,
//! flattening `BEGIN … END` blocks into their contained statement list.
//! This is a textual pass (tracking quotes and parenthesis depth) rather
//! than a full parse, so it doesn't need a grammar for BigQuery's
//! procedural scripting extensions — only for where a statement ends.

/// Splits on top-level `;`, ignoring semicolons inside string/identifier
/// quotes or nested parentheses, then recursively flattens any statement
/// that is itself a `BEGIN … END` block.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut out = Vec::new();
    for raw in split_top_level(script) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(body) = strip_begin_end(trimmed) {
            out.extend(split_statements(&body));
        } else {
            out.push(trimmed.to_string());
        }
    }
    out
}

fn split_top_level(script: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut chars = script.chars().peekable();
    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth -= 1;
                    current.push(c);
                }
                ';' if depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

fn strip_begin_end(stmt: &str) -> Option<String> {
    let upper = stmt.to_ascii_uppercase();
    if !upper.starts_with("BEGIN") {
        return None;
    }
    let after_begin = &stmt[5..];
    let upper_rest = after_begin.trim_end().to_ascii_uppercase();
    if upper_rest.ends_with("END") {
        let body_len = after_begin.trim_end().len() - 3;
        return Some(after_begin[..body_len].to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_top_level_semicolons() {
        let stmts = split_statements("SELECT 1; SELECT 2;");
        assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn ignores_semicolons_inside_string_literals() {
        let stmts = split_statements("SELECT ';'; SELECT 2;");
        assert_eq!(stmts, vec!["SELECT ';'", "SELECT 2"]);
    }

    #[test]
    fn flattens_begin_end_block() {
        let stmts = split_statements("BEGIN SELECT 1; SELECT 2; END;");
        assert_eq!(stmts, vec!["SELECT 1", "SELECT 2"]);
    }

    #[test]
    fn nested_parens_do_not_split() {
        let stmts = split_statements("SELECT (SELECT 1 + (2; 3)); SELECT 2;");
        assert_eq!(stmts.len(), 2);
    }
}
