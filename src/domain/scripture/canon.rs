//! 正典书卷表
//!
//! book_id 即正典顺序（1..=66），跨书卷导航依赖这一顺序。

/// 正典书卷: (book_id, 代码, 名称, 最大章数)
pub const CANON: &[(i64, &str, &str, u32)] = &[
    (1, "GEN", "Genesis", 50),
    (2, "EXO", "Exodus", 40),
    (3, "LEV", "Leviticus", 27),
    (4, "NUM", "Numbers", 36),
    (5, "DEU", "Deuteronomy", 34),
    (6, "JOS", "Joshua", 24),
    (7, "JDG", "Judges", 21),
    (8, "RUT", "Ruth", 4),
    (9, "1SA", "1 Samuel", 31),
    (10, "2SA", "2 Samuel", 24),
    (11, "1KI", "1 Kings", 22),
    (12, "2KI", "2 Kings", 25),
    (13, "1CH", "1 Chronicles", 29),
    (14, "2CH", "2 Chronicles", 36),
    (15, "EZR", "Ezra", 10),
    (16, "NEH", "Nehemiah", 13),
    (17, "EST", "Esther", 10),
    (18, "JOB", "Job", 42),
    (19, "PSA", "Psalms", 150),
    (20, "PRO", "Proverbs", 31),
    (21, "ECC", "Ecclesiastes", 12),
    (22, "SNG", "Song of Songs", 8),
    (23, "ISA", "Isaiah", 66),
    (24, "JER", "Jeremiah", 52),
    (25, "LAM", "Lamentations", 5),
    (26, "EZK", "Ezekiel", 48),
    (27, "DAN", "Daniel", 12),
    (28, "HOS", "Hosea", 14),
    (29, "JOL", "Joel", 3),
    (30, "AMO", "Amos", 9),
    (31, "OBA", "Obadiah", 1),
    (32, "JON", "Jonah", 4),
    (33, "MIC", "Micah", 7),
    (34, "NAM", "Nahum", 3),
    (35, "HAB", "Habakkuk", 3),
    (36, "ZEP", "Zephaniah", 3),
    (37, "HAG", "Haggai", 2),
    (38, "ZEC", "Zechariah", 14),
    (39, "MAL", "Malachi", 4),
    (40, "MAT", "Matthew", 28),
    (41, "MRK", "Mark", 16),
    (42, "LUK", "Luke", 24),
    (43, "JHN", "John", 21),
    (44, "ACT", "Acts", 28),
    (45, "ROM", "Romans", 16),
    (46, "1CO", "1 Corinthians", 16),
    (47, "2CO", "2 Corinthians", 13),
    (48, "GAL", "Galatians", 6),
    (49, "EPH", "Ephesians", 6),
    (50, "PHP", "Philippians", 4),
    (51, "COL", "Colossians", 4),
    (52, "1TH", "1 Thessalonians", 5),
    (53, "2TH", "2 Thessalonians", 3),
    (54, "1TI", "1 Timothy", 6),
    (55, "2TI", "2 Timothy", 4),
    (56, "TIT", "Titus", 3),
    (57, "PHM", "Philemon", 1),
    (58, "HEB", "Hebrews", 13),
    (59, "JAS", "James", 5),
    (60, "1PE", "1 Peter", 5),
    (61, "2PE", "2 Peter", 3),
    (62, "1JN", "1 John", 5),
    (63, "2JN", "2 John", 1),
    (64, "3JN", "3 John", 1),
    (65, "JUD", "Jude", 1),
    (66, "REV", "Revelation", 22),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canon_is_ordered_by_id() {
        assert_eq!(CANON.len(), 66);
        for (index, (book_id, ..)) in CANON.iter().enumerate() {
            assert_eq!(*book_id, index as i64 + 1);
        }
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = CANON.iter().map(|(_, code, ..)| *code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), CANON.len());
    }
}
