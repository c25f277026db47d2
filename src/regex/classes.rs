use indexmap::IndexSet;
use std::{cmp::Ordering, fmt, ops::Index};

/// Largest Unicode code point.
pub const MAX_CHAR: u32 = 0x10FFFF;

/// Number of a symbol class. Classes are numbered from 1, so that 0 can stand for the empty transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

/// The epsilon "class". Never returned by a lookup in [`ClassTable`].
pub const EPSILON: ClassId = ClassId(0);

impl ClassId {
    pub fn of(index: usize) -> Self {
        assert!(index < u32::MAX as usize);
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_epsilon(self) -> bool {
        self == EPSILON
    }
}

/// Inclusive interval of code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharacterRange {
    pub from: u32,
    pub to: u32,
}

impl CharacterRange {
    pub fn new(from: u32, to: u32) -> Self {
        assert!(from <= to, "inverted range {:#x}-{:#x}", from, to);
        assert!(to <= MAX_CHAR, "{:#x} is not a code point", to);
        Self { from, to }
    }

    pub fn single(c: char) -> Self {
        Self::new(c as u32, c as u32)
    }

    pub fn chars(from: char, to: char) -> Self {
        Self::new(from as u32, to as u32)
    }

    pub fn contains(&self, c: u32) -> bool {
        self.from <= c && c <= self.to
    }

    pub fn is_single(&self) -> bool {
        self.from == self.to
    }
}

fn fmt_code_point(f: &mut fmt::Formatter<'_>, c: u32) -> fmt::Result {
    match std::char::from_u32(c) {
        Some(c) if !c.is_control() && !c.is_whitespace() => write!(f, "{}", c),
        _ => write!(f, "\\u{{{:x}}}", c),
    }
}

impl fmt::Display for CharacterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_code_point(f, self.from)?;
        if !self.is_single() {
            write!(f, "-")?;
            fmt_code_point(f, self.to)?;
        }
        Ok(())
    }
}

/// A run of consecutive classes, `first..=last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassSpan {
    pub first: ClassId,
    pub last: ClassId,
}

impl ClassSpan {
    pub fn iter(&self) -> impl Iterator<Item = ClassId> {
        (self.first.0..=self.last.0).map(ClassId)
    }

    pub fn len(&self) -> usize {
        (self.last.0 - self.first.0) as usize + 1
    }
}

/// Collects every range a regex mentions. Declaring a range twice has no effect.
#[derive(Debug, Clone, Default)]
pub struct ClassTableBuilder {
    declared: IndexSet<CharacterRange>,
}

impl ClassTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, range: CharacterRange) -> &mut Self {
        self.declared.insert(range);
        self
    }

    pub fn add_char(&mut self, c: char) -> &mut Self {
        self.add(CharacterRange::single(c))
    }

    pub fn add_range(&mut self, from: char, to: char) -> &mut Self {
        self.add(CharacterRange::chars(from, to))
    }

    pub fn declared(&self) -> impl Iterator<Item = &CharacterRange> {
        self.declared.iter()
    }

    /// Splits the declared ranges into disjoint classes.
    ///
    /// Class boundaries only ever fall on declared endpoints, so every declared
    /// range is covered by a contiguous run of classes.
    pub fn build(&self) -> ClassTable {
        let mut sorted: Vec<CharacterRange> = self.declared.iter().copied().collect();
        sorted.sort();

        let mut ranges = Vec::with_capacity(sorted.len());
        let mut i = 0;
        while i < sorted.len() {
            let group = overlapping_group(&sorted[i..]);
            split_overlapping(group, &mut ranges);
            i += group.len();
        }

        log::trace!(
            "class table: {} declared ranges, {} classes",
            sorted.len(),
            ranges.len()
        );

        ClassTable { ranges }
    }
}

/// The longest prefix of `sorted` whose ranges overlap each other transitively.
fn overlapping_group(sorted: &[CharacterRange]) -> &[CharacterRange] {
    let mut max_to = sorted[0].to;
    let mut len = 1;
    for range in &sorted[1..] {
        if range.from > max_to {
            break;
        }
        max_to = max_to.max(range.to);
        len += 1;
    }
    &sorted[..len]
}

fn split_overlapping(group: &[CharacterRange], out: &mut Vec<CharacterRange>) {
    let is_left = |c: u32| group.iter().any(|r| r.from == c);
    let is_right = |c: u32| group.iter().any(|r| r.to == c);

    let mut points: Vec<u32> = group.iter().flat_map(|r| vec![r.from, r.to]).collect();
    points.sort_unstable();
    points.dedup();

    let mut i = 0;
    loop {
        let mut c = points[i];
        if is_right(c) {
            if is_left(c) {
                out.push(CharacterRange::new(c, c));
            }
            c += 1;
        }

        i += 1;
        if i >= points.len() {
            break;
        }

        // Points strictly increase, so `next` is at least 1 here.
        let mut next = points[i];
        if is_left(next) {
            next -= 1;
        }
        if c <= next {
            out.push(CharacterRange::new(c, next));
        }
    }
}

/// Sorted, disjoint character classes numbered `1..=len()`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ClassTable {
    ranges: Vec<CharacterRange>,
}

impl ClassTable {
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[CharacterRange] {
        &self.ranges
    }

    /// Every class number, in ascending order.
    pub fn classes(&self) -> impl Iterator<Item = ClassId> {
        (1..=self.ranges.len() as u32).map(ClassId)
    }

    pub fn range_of(&self, class: ClassId) -> CharacterRange {
        self[class]
    }

    /// The class that is exactly `[c, c]`.
    pub fn class_of_exact_char(&self, c: char) -> Option<ClassId> {
        let span = self.class_span_of_exact_range(c as u32, c as u32)?;
        if span.first == span.last {
            Some(span.first)
        } else {
            None
        }
    }

    /// The classes whose union is exactly `[from, to]`. Fails unless `from` starts
    /// a class and `to` ends one.
    pub fn class_span_of_exact_range(&self, from: u32, to: u32) -> Option<ClassSpan> {
        let first = self.ranges.binary_search_by_key(&from, |r| r.from).ok()?;
        let last = self.ranges.binary_search_by_key(&to, |r| r.to).ok()?;
        if first > last {
            return None;
        }
        Some(ClassSpan {
            first: ClassId::of(first + 1),
            last: ClassId::of(last + 1),
        })
    }

    /// The class containing `c`, if `c` was declared at all.
    pub fn class_of_input_char(&self, c: char) -> Option<ClassId> {
        let c = c as u32;
        self.ranges
            .binary_search_by(|r| {
                if r.to < c {
                    Ordering::Less
                } else if r.from > c {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .ok()
            .map(|i| ClassId::of(i + 1))
    }
}

impl Index<ClassId> for ClassTable {
    type Output = CharacterRange;
    fn index(&self, class: ClassId) -> &Self::Output {
        assert!(!class.is_epsilon(), "epsilon has no character range");
        &self.ranges[class.index() - 1]
    }
}

impl fmt::Display for ClassTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", range)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ClassTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassTable[{}]", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(ranges: &[(u32, u32)]) -> ClassTable {
        let mut builder = ClassTableBuilder::new();
        for (from, to) in ranges {
            builder.add(CharacterRange::new(*from, *to));
        }
        builder.build()
    }

    fn pairs(table: &ClassTable) -> Vec<(u32, u32)> {
        table.ranges().iter().map(|r| (r.from, r.to)).collect()
    }

    fn span(table: &ClassTable, from: u32, to: u32) -> Option<(u32, u32)> {
        table
            .class_span_of_exact_range(from, to)
            .map(|s| (s.first.0, s.last.0))
    }

    #[test]
    fn overlapping_prefix() {
        let t = table(&[(1, 2), (2, 2), (3, 5)]);
        assert_eq!(pairs(&t), vec![(1, 1), (2, 2), (3, 5)]);
        assert_eq!(span(&t, 2, 2), Some((2, 2)));
        assert_eq!(span(&t, 4, 4), None);
        assert_eq!(span(&t, 3, 5), Some((3, 3)));
        assert_eq!(span(&t, 1, 4), None);
        assert_eq!(span(&t, 1, 5), Some((1, 3)));
    }

    #[test]
    fn lone_range_has_no_singletons() {
        let t = table(&[(1, 2)]);
        assert_eq!(pairs(&t), vec![(1, 2)]);
        assert_eq!(span(&t, 1, 1), None);
        assert_eq!(t.class_of_input_char('\u{3}'), None);
        assert_eq!(t.class_of_input_char('\u{2}'), Some(ClassId(1)));
    }

    #[test]
    fn unordered_declarations() {
        let t = table(&[(6, 6), (2, 5), (2, 2), (7, 8), (1, 3)]);
        assert_eq!(
            pairs(&t),
            vec![(1, 1), (2, 2), (3, 3), (4, 5), (6, 6), (7, 8)]
        );
    }

    #[test]
    fn letters() {
        let mut builder = ClassTableBuilder::new();
        builder
            .add_range('e', 'f')
            .add_range('a', 'f')
            .add_range('a', 'd')
            .add_char('d')
            .add_range('c', 'h')
            .add_char('h')
            .add_char('a');
        let t = builder.build();
        assert_eq!(t.to_string(), "a, b, c, d, e-f, g, h");
        assert_eq!(t.class_of_exact_char('a'), Some(ClassId(1)));
        assert_eq!(t.class_of_exact_char('e'), None);
        assert_eq!(
            t.class_span_of_exact_range('c' as u32, 'h' as u32),
            Some(ClassSpan {
                first: ClassId(3),
                last: ClassId(7)
            })
        );
    }

    #[test]
    fn overlapping_splits() {
        let t = table(&[(1, 4), (2, 6), (4, 5), (6, 9)]);
        assert_eq!(
            pairs(&t),
            vec![(1, 1), (2, 3), (4, 4), (5, 5), (6, 6), (7, 9)]
        );

        let mut b = ClassTableBuilder::new();
        b.add_range('a', 'g').add_range('d', 'k').add_range('e', 'g');
        assert_eq!(b.build().to_string(), "a-c, d, e-g, h-k");

        let mut b = ClassTableBuilder::new();
        b.add_range('a', 'f').add_range('e', 'k').add_range('g', 'l');
        assert_eq!(b.build().to_string(), "a-d, e-f, g-k, l");

        let mut b = ClassTableBuilder::new();
        b.add_range('a', 'b').add_char('a').add_range('a', 'e');
        assert_eq!(b.build().to_string(), "a, b, c-e");
    }

    #[test]
    fn empty_table() {
        let t = ClassTableBuilder::new().build();
        assert!(t.is_empty());
        assert_eq!(t.classes().count(), 0);
        assert_eq!(t.class_of_exact_char('a'), None);
        assert_eq!(t.class_span_of_exact_range(1, 5), None);
        assert_eq!(t.class_of_input_char('a'), None);
    }

    #[test]
    fn inverted_query_is_not_found() {
        let t = table(&[(1, 2), (5, 9)]);
        assert_eq!(span(&t, 5, 2), None);
    }

    #[test]
    fn full_code_point_space() {
        let t = table(&[(0, MAX_CHAR), (MAX_CHAR, MAX_CHAR)]);
        assert_eq!(pairs(&t), vec![(0, MAX_CHAR - 1), (MAX_CHAR, MAX_CHAR)]);
        assert_eq!(span(&t, 0, MAX_CHAR), Some((1, 2)));
    }

    #[test]
    #[should_panic(expected = "epsilon has no character range")]
    fn epsilon_has_no_range() {
        let t = table(&[(1, 2)]);
        let _ = t[EPSILON];
    }

    #[test]
    #[should_panic(expected = "is not a code point")]
    fn ranges_stay_within_unicode() {
        CharacterRange::new(0, u32::MAX);
    }

    fn arbitrary_table(raw: &[(u8, u8)]) -> (Vec<CharacterRange>, ClassTable) {
        let declared: Vec<_> = raw
            .iter()
            .map(|&(a, b)| CharacterRange::new(a.min(b) as u32, a.max(b) as u32))
            .collect();
        let mut builder = ClassTableBuilder::new();
        for r in &declared {
            builder.add(*r);
        }
        (declared, builder.build())
    }

    #[quickcheck]
    fn classes_are_sorted_and_disjoint(raw: Vec<(u8, u8)>) -> bool {
        let (_, t) = arbitrary_table(&raw);
        t.ranges().windows(2).all(|w| w[0].to < w[1].from)
    }

    #[quickcheck]
    fn classes_cover_exactly_the_declared_chars(raw: Vec<(u8, u8)>) -> bool {
        let (declared, t) = arbitrary_table(&raw);
        (0..=255u32).all(|c| {
            let in_declared = declared.iter().any(|r| r.contains(c));
            let in_classes = t.ranges().iter().any(|r| r.contains(c));
            in_declared == in_classes
        })
    }

    #[quickcheck]
    fn declared_ranges_map_to_contiguous_spans(raw: Vec<(u8, u8)>) -> bool {
        let (declared, t) = arbitrary_table(&raw);
        declared.iter().all(|r| match t.class_span_of_exact_range(r.from, r.to) {
            Some(span) => {
                span.iter().all(|class| {
                    let c = t.range_of(class);
                    r.from <= c.from && c.to <= r.to
                }) && t.range_of(span.first).from == r.from
                    && t.range_of(span.last).to == r.to
            }
            None => false,
        })
    }

    #[quickcheck]
    fn building_is_idempotent(raw: Vec<(u8, u8)>) -> bool {
        let (declared, once) = arbitrary_table(&raw);
        let mut builder = ClassTableBuilder::new();
        for r in declared.iter().chain(declared.iter()) {
            builder.add(*r);
        }
        builder.build() == once
    }
}
