use crate::FileRecord;
use crate::extract::RedactionMap;

/// One line of the filtered file view.
///
/// `number` is the line's position in the post-removal coordinate space;
/// `selected` marks the line the current annotation is anchored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine<'a> {
    pub number: u32,
    pub text: &'a str,
    pub selected: bool,
}

/// Produce the file view the reviewer sees: the body with every annotation
/// comment block removed, survivors renumbered from 1.
///
/// Filtering goes through the same [`RedactionMap`] the extractor derives
/// line numbers from, so the displayed numbering always matches the number
/// that will be published.
pub fn filtered_lines<'a>(record: &'a FileRecord, selected: usize) -> Vec<DisplayLine<'a>> {
    let map = RedactionMap::from_annotations(&record.annotations);
    let target = record.annotations.get(selected).map(|a| a.line);

    let mut out = Vec::new();
    let mut number = 0u32;
    for (idx, text) in record.body.lines().enumerate() {
        let raw = idx as u32 + 1;
        if map.covers(raw) {
            continue;
        }
        number += 1;
        out.push(DisplayLine {
            number,
            text,
            selected: Some(number) == target,
        });
    }
    out
}
