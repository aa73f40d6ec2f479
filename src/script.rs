/// Splits a script into scene descriptions on blank-line boundaries.
///
/// Lines within a paragraph are joined with a single space; paragraphs that
/// are empty or whitespace-only after trimming are dropped. Each retained
/// scene maps to exactly one generated frame.
pub fn parse_scenes(text: &str) -> Vec<String> {
    let mut scenes = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                scenes.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        scenes.push(current);
    }
    scenes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines() {
        let scenes = parse_scenes("A dark forest.\n\nA lightning battle.");
        assert_eq!(scenes, vec!["A dark forest.", "A lightning battle."]);
    }

    #[test]
    fn joins_lines_within_a_paragraph() {
        let scenes = parse_scenes("A lone figure\nwalks through fog.\n\nAn ancient temple.");
        assert_eq!(
            scenes,
            vec!["A lone figure walks through fog.", "An ancient temple."]
        );
    }

    #[test]
    fn drops_whitespace_only_paragraphs() {
        let scenes = parse_scenes("First scene.\n\n   \t\n\nSecond scene.\n\n\n");
        assert_eq!(scenes, vec!["First scene.", "Second scene."]);
    }

    #[test]
    fn blank_only_input_yields_no_scenes() {
        assert!(parse_scenes("").is_empty());
        assert!(parse_scenes("\n\n  \n\t\n").is_empty());
    }

    #[test]
    fn handles_crlf_input() {
        let scenes = parse_scenes("One.\r\n\r\nTwo.\r\n");
        assert_eq!(scenes, vec!["One.", "Two."]);
    }
}
