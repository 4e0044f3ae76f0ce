/// Get the content of a 1-based line, without its terminator.
pub fn get_line_content(content: &str, line: u32) -> Option<&str> {
    content
        .lines()
        .nth(line.checked_sub(1)? as usize)
        .map(|l| l.trim_end_matches('\r'))
}
