//! 经文分解器
//!
//! 把结构节点序列分解为扁平的 (章, 节, 文本) 记录。
//! 经节区间（"23-24"）和分组（"5,7"）展开为每个经节一条记录，共享同一段文本。

use std::collections::BTreeSet;

use super::{ParagraphItem, ScriptureError, StructuralNode, Verse};

/// 区间终点上限（最长的一章为 176 节）
pub const MAX_RANGE_END: u32 = 500;

/// 分解结构节点序列
///
/// 输出顺序即文档顺序，不按经节号排序。
/// 单个经节标记无法解析时只跳过该标记（记录警告），不影响整个文档。
///
/// # 错误
/// 在任何 Chapter 节点之前出现经节标记时返回 `StructuralInconsistency`。
pub fn decompose(nodes: &[StructuralNode]) -> Result<Vec<Verse>, ScriptureError> {
    let mut verses = Vec::new();
    let mut current_chapter: Option<u32> = None;

    for node in nodes {
        match node {
            StructuralNode::Chapter { number } => current_chapter = Some(*number),
            StructuralNode::Paragraph { content, .. } => {
                decompose_paragraph(content, current_chapter, &mut verses)?;
            }
            StructuralNode::Book { .. } => {}
        }
    }

    Ok(verses)
}

/// 正在收集文本的经节标记
struct PendingVerse<'a> {
    label: &'a str,
    chapter: u32,
    parts: Vec<&'a str>,
}

fn decompose_paragraph(
    content: &[ParagraphItem],
    current_chapter: Option<u32>,
    out: &mut Vec<Verse>,
) -> Result<(), ScriptureError> {
    let mut pending: Option<PendingVerse> = None;

    for item in content {
        match item {
            ParagraphItem::VerseMarker { number } => {
                if let Some(done) = pending.take() {
                    emit(done, out);
                }
                let chapter = current_chapter.ok_or_else(|| {
                    ScriptureError::StructuralInconsistency(format!(
                        "verse marker \"{}\" appears before any chapter",
                        number
                    ))
                })?;
                pending = Some(PendingVerse {
                    label: number,
                    chapter,
                    parts: Vec::new(),
                });
            }
            ParagraphItem::TextRun(text) => {
                // 段落中第一个经节标记之前的文本被丢弃
                if let Some(verse) = pending.as_mut() {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        verse.parts.push(trimmed);
                    }
                }
            }
        }
    }

    if let Some(done) = pending.take() {
        emit(done, out);
    }

    Ok(())
}

fn emit(pending: PendingVerse<'_>, out: &mut Vec<Verse>) {
    if pending.parts.is_empty() {
        return;
    }

    let numbers = match expand_verse_numbers(pending.label) {
        Ok(numbers) => numbers,
        Err(e) => {
            tracing::warn!(
                chapter = pending.chapter,
                label = %pending.label,
                error = %e,
                "Skipping unparseable verse marker"
            );
            return;
        }
    };

    let text = pending.parts.join(" ");
    for verse in numbers {
        out.push(Verse::new(pending.chapter, verse, text.clone()));
    }
}

/// 展开经节编号标签
///
/// 按逗号分组；含连字符的分组展开为闭区间，区间两端无法解析时
/// 退回把整个分组当作单个整数。结果去重并升序排列。
/// 区间终点超过 [`MAX_RANGE_END`] 时整个标签视为无法解析。
///
/// ```
/// use isl_admin::domain::scripture::expand_verse_numbers;
///
/// assert_eq!(expand_verse_numbers("23-24").unwrap(), vec![23, 24]);
/// assert_eq!(expand_verse_numbers("5,7").unwrap(), vec![5, 7]);
/// ```
pub fn expand_verse_numbers(label: &str) -> Result<Vec<u32>, ScriptureError> {
    let mut numbers = BTreeSet::new();

    for group in label.split(',') {
        let group = group.trim();

        let range = group.split_once('-').and_then(|(start, end)| {
            let start = start.trim().parse::<u32>().ok()?;
            let end = end.trim().parse::<u32>().ok()?;
            Some(start..=end)
        });

        match range {
            Some(range) if *range.end() > MAX_RANGE_END => {
                return Err(ScriptureError::InvalidVerseNumber(label.to_string()));
            }
            Some(range) => numbers.extend(range),
            None => {
                let single = group
                    .parse::<u32>()
                    .map_err(|_| ScriptureError::InvalidVerseNumber(label.to_string()))?;
                numbers.insert(single);
            }
        }
    }

    Ok(numbers.into_iter().collect())
}

/// 文档中 Chapter 节点的数量（与是否产生经节无关）
pub fn count_chapters(nodes: &[StructuralNode]) -> usize {
    nodes
        .iter()
        .filter(|node| matches!(node, StructuralNode::Chapter { .. }))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(number: u32) -> StructuralNode {
        StructuralNode::Chapter { number }
    }

    fn para(items: Vec<ParagraphItem>) -> StructuralNode {
        StructuralNode::Paragraph {
            marker: "p".to_string(),
            content: items,
        }
    }

    fn v(number: &str) -> ParagraphItem {
        ParagraphItem::VerseMarker {
            number: number.to_string(),
        }
    }

    fn t(text: &str) -> ParagraphItem {
        ParagraphItem::TextRun(text.to_string())
    }

    fn triples(verses: &[Verse]) -> Vec<(u32, u32, &str)> {
        verses
            .iter()
            .map(|v| (v.chapter(), v.verse(), v.text()))
            .collect()
    }

    #[test]
    fn test_single_markers_in_document_order() {
        let nodes = vec![
            StructuralNode::Book { code: "GEN".into() },
            chapter(1),
            para(vec![v("1"), t("One"), v("2"), t("Two"), v("3"), t("Three")]),
        ];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(
            triples(&verses),
            vec![(1, 1, "One"), (1, 2, "Two"), (1, 3, "Three")]
        );
    }

    #[test]
    fn test_range_marker_shares_text() {
        let nodes = vec![chapter(4), para(vec![v("23-24"), t("Hello")])];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(4, 23, "Hello"), (4, 24, "Hello")]);
    }

    #[test]
    fn test_group_marker_skips_gap() {
        let nodes = vec![chapter(1), para(vec![v("5,7"), t("Grouped")])];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(1, 5, "Grouped"), (1, 7, "Grouped")]);
    }

    #[test]
    fn test_marker_without_text_is_dropped() {
        let nodes = vec![chapter(1), para(vec![v("1"), v("2"), t("Second")])];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(1, 2, "Second")]);
    }

    #[test]
    fn test_whitespace_only_text_counts_as_empty() {
        let nodes = vec![chapter(1), para(vec![v("1"), t("   "), v("2"), t("x")])];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(1, 2, "x")]);
    }

    #[test]
    fn test_text_runs_are_trimmed_and_joined() {
        let nodes = vec![
            chapter(1),
            para(vec![v("1"), t("  In the "), t("beginning  "), t("God")]),
        ];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(verses[0].text(), "In the beginning God");
    }

    #[test]
    fn test_text_before_first_marker_is_discarded() {
        let nodes = vec![
            chapter(2),
            para(vec![t("continued from before"), v("4"), t("Four")]),
        ];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(2, 4, "Four")]);
    }

    #[test]
    fn test_paragraph_without_marker_contributes_nothing() {
        let nodes = vec![chapter(1), para(vec![t("A heading")])];
        assert!(decompose(&nodes).unwrap().is_empty());
    }

    #[test]
    fn test_verse_ends_at_paragraph_boundary() {
        let nodes = vec![
            chapter(1),
            para(vec![v("1"), t("First part")]),
            para(vec![t("second part"), v("2"), t("Two")]),
        ];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(1, 1, "First part"), (1, 2, "Two")]);
    }

    #[test]
    fn test_chapter_tracks_across_paragraphs() {
        let nodes = vec![
            chapter(1),
            para(vec![v("1"), t("a")]),
            chapter(2),
            para(vec![v("1"), t("b")]),
        ];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(1, 1, "a"), (2, 1, "b")]);
    }

    #[test]
    fn test_verse_before_chapter_is_rejected() {
        let nodes = vec![para(vec![v("1"), t("orphan")]), chapter(1)];

        let err = decompose(&nodes).unwrap_err();
        assert!(matches!(err, ScriptureError::StructuralInconsistency(_)));
    }

    #[test]
    fn test_text_before_chapter_without_marker_is_excluded() {
        let nodes = vec![
            para(vec![t("Introduction")]),
            chapter(1),
            para(vec![v("1"), t("a")]),
        ];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(1, 1, "a")]);
    }

    #[test]
    fn test_unparseable_marker_is_skipped() {
        let nodes = vec![
            chapter(1),
            para(vec![v("x"), t("bad"), v("2"), t("good")]),
        ];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(1, 2, "good")]);
    }

    #[test]
    fn test_oversized_range_marker_is_skipped() {
        let nodes = vec![
            chapter(1),
            para(vec![v("1-20000000"), t("x"), v("2"), t("kept")]),
        ];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(triples(&verses), vec![(1, 2, "kept")]);
    }

    #[test]
    fn test_duplicate_numbers_are_emitted_as_is() {
        let nodes = vec![
            chapter(1),
            para(vec![v("4-5"), t("first"), v("5"), t("second")]),
        ];

        let verses = decompose(&nodes).unwrap();
        assert_eq!(
            triples(&verses),
            vec![(1, 4, "first"), (1, 5, "first"), (1, 5, "second")]
        );
    }

    #[test]
    fn test_expand_single() {
        assert_eq!(expand_verse_numbers("7").unwrap(), vec![7]);
        assert_eq!(expand_verse_numbers(" 12 ").unwrap(), vec![12]);
    }

    #[test]
    fn test_expand_union_is_sorted_and_deduplicated() {
        assert_eq!(expand_verse_numbers("9,3-5,4").unwrap(), vec![3, 4, 5, 9]);
    }

    #[test]
    fn test_expand_reversed_range_is_empty() {
        assert_eq!(expand_verse_numbers("5-3").unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_expand_failures() {
        assert!(expand_verse_numbers("").is_err());
        assert!(expand_verse_numbers("1a").is_err());
        assert!(expand_verse_numbers("3-b").is_err());
        assert!(expand_verse_numbers("5,").is_err());
    }

    #[test]
    fn test_expand_range_end_is_bounded() {
        assert_eq!(expand_verse_numbers("1-500").unwrap().len(), 500);
        assert!(expand_verse_numbers("1-501").is_err());
        assert!(expand_verse_numbers("3,1-4000000000").is_err());
    }

    #[test]
    fn test_count_chapters_ignores_verse_output() {
        let nodes = vec![chapter(1), chapter(2), para(vec![v("1"), t("a")]), chapter(3)];
        assert_eq!(count_chapters(&nodes), 3);
    }
}
