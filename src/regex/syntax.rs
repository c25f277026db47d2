use regex_syntax::{
    ast::{self, Ast},
    hir::{self, translate::TranslatorBuilder, Hir, HirKind},
};
use std::convert::TryFrom;

use super::classes::{CharacterRange, ClassTable, ClassTableBuilder, MAX_CHAR};

/// A regular expression, reduced to the constructs an automaton can recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regex {
    Char(char),
    Range(CharacterRange),
    /// Any of the ranges. An empty list behaves like [`Regex::Empty`].
    RangeList(Vec<CharacterRange>),
    Concat(Vec<Regex>),
    Alternation(Vec<Regex>),
    /// Matches the empty string.
    Empty,
    Optional(Box<Regex>),
    ZeroOrMore(Box<Regex>),
    OneOrMore(Box<Regex>),
}

/// Upper bound on the nodes counted repetitions may expand to.
pub const DEFAULT_SIZE_LIMIT: usize = 100_000;

impl Regex {
    /// Parses `pattern` with `regex_syntax` and lowers it.
    ///
    /// `.` matches any character, line breaks included. `\d`, `\w` and `\s` are the
    /// ASCII sets `[0-9]`, `[a-zA-Z0-9_]` and `[ \t\r\n\f]`, and `\b` is a backspace.
    pub fn parse(pattern: &str) -> Result<Self, UnsupportedFeature> {
        Self::parse_with_limit(pattern, DEFAULT_SIZE_LIMIT)
    }

    /// Like [`Regex::parse`], failing once counted repetitions expand past `limit` nodes.
    pub fn parse_with_limit(pattern: &str, limit: usize) -> Result<Self, UnsupportedFeature> {
        let mut ast = ast::parse::Parser::new()
            .parse(pattern)
            .map_err(|e| UnsupportedFeature::Parse(e.into()))?;
        rewrite_escapes(&mut ast);
        let hir = TranslatorBuilder::new()
            .dot_matches_new_line(true)
            .build()
            .translate(pattern, &ast)
            .map_err(|e| UnsupportedFeature::Parse(e.into()))?;
        Lowering { limit, used: 0 }.lower(&hir)
    }

    /// Number of nodes in the tree. A range list counts once.
    pub fn size(&self) -> usize {
        match self {
            Regex::Char(_) | Regex::Range(_) | Regex::RangeList(_) | Regex::Empty => 1,
            Regex::Concat(items) | Regex::Alternation(items) => {
                1 + items.iter().map(Regex::size).sum::<usize>()
            }
            Regex::Optional(inner) | Regex::ZeroOrMore(inner) | Regex::OneOrMore(inner) => {
                1 + inner.size()
            }
        }
    }

    pub fn literal(text: &str) -> Self {
        Regex::Concat(text.chars().map(Regex::Char).collect())
    }

    /// Every code point not covered by `ranges`.
    pub fn negated(ranges: &[CharacterRange]) -> Self {
        let mut sorted = ranges.to_vec();
        sorted.sort();

        let mut complement = Vec::new();
        let mut next = 0u32;
        for r in sorted {
            if r.from > next {
                complement.push(CharacterRange::new(next, r.from - 1));
            }
            next = next.max(r.to.saturating_add(1));
        }
        if next <= MAX_CHAR {
            complement.push(CharacterRange::new(next, MAX_CHAR));
        }

        Regex::RangeList(complement)
    }

    /// Declares every character and range this expression mentions.
    pub fn collect_ranges(&self, builder: &mut ClassTableBuilder) {
        match self {
            Regex::Char(c) => {
                builder.add_char(*c);
            }
            Regex::Range(range) => {
                builder.add(*range);
            }
            Regex::RangeList(ranges) => {
                for range in ranges {
                    builder.add(*range);
                }
            }
            Regex::Concat(items) | Regex::Alternation(items) => {
                for item in items {
                    item.collect_ranges(builder);
                }
            }
            Regex::Empty => {}
            Regex::Optional(inner) | Regex::ZeroOrMore(inner) | Regex::OneOrMore(inner) => {
                inner.collect_ranges(builder)
            }
        }
    }

    pub fn class_table(&self) -> ClassTable {
        let mut builder = ClassTableBuilder::new();
        self.collect_ranges(&mut builder);
        builder.build()
    }
}

impl ClassTable {
    pub fn from_regex(regex: &Regex) -> Self {
        regex.class_table()
    }
}

/// Syntax `regex_syntax` accepts that has no meaning for a whole-string recognizer.
#[derive(Debug, thiserror::Error)]
pub enum UnsupportedFeature {
    #[error("multi-line start anchors ((?m)^) are not supported")]
    StartLine,
    #[error("multi-line end anchors ((?m)$) are not supported")]
    EndLine,
    #[error("start of text anchors (^ or \\A) are not supported, escape ^ as \\^")]
    StartText,
    #[error("end of text anchors ($ or \\z) are not supported, escape $ as \\$")]
    EndText,
    #[error("unicode word boundaries (\\b) are not supported")]
    WordBoundaryUnicode,
    #[error("negated unicode word boundaries (\\B) are not supported")]
    WordBoundaryUnicodeNegate,
    #[error("ascii word boundaries ((?-u:\\b)) are not supported")]
    WordBoundaryAscii,
    #[error("negated ascii word boundaries ((?-u:\\B)) are not supported")]
    WordBoundaryAsciiNegate,
    #[error("counted repetitions expand to more than {limit} nodes")]
    TooLarge { limit: usize },
    #[error(transparent)]
    Parse(regex_syntax::Error),
}

fn ascii_set(span: ast::Span, kind: &ast::ClassPerlKind) -> Vec<ast::ClassSetItem> {
    let lit = |c| ast::Literal {
        span,
        kind: ast::LiteralKind::Verbatim,
        c,
    };
    let range = |from, to| {
        ast::ClassSetItem::Range(ast::ClassSetRange {
            span,
            start: lit(from),
            end: lit(to),
        })
    };
    match kind {
        ast::ClassPerlKind::Digit => vec![range('0', '9')],
        ast::ClassPerlKind::Word => vec![
            range('a', 'z'),
            range('A', 'Z'),
            range('0', '9'),
            ast::ClassSetItem::Literal(lit('_')),
        ],
        ast::ClassPerlKind::Space => [' ', '\t', '\r', '\n', '\u{c}']
            .iter()
            .map(|&c| ast::ClassSetItem::Literal(lit(c)))
            .collect(),
    }
}

fn ascii_class(perl: &ast::ClassPerl) -> ast::ClassBracketed {
    ast::ClassBracketed {
        span: perl.span,
        negated: perl.negated,
        kind: ast::ClassSet::Item(ast::ClassSetItem::Union(ast::ClassSetUnion {
            span: perl.span,
            items: ascii_set(perl.span, &perl.kind),
        })),
    }
}

fn rewrite_set_item(item: &mut ast::ClassSetItem) {
    match item {
        ast::ClassSetItem::Perl(perl) => {
            *item = ast::ClassSetItem::Bracketed(Box::new(ascii_class(perl)));
        }
        ast::ClassSetItem::Bracketed(inner) => rewrite_set(&mut inner.kind),
        ast::ClassSetItem::Union(union) => union.items.iter_mut().for_each(rewrite_set_item),
        _ => {}
    }
}

fn rewrite_set(set: &mut ast::ClassSet) {
    match set {
        ast::ClassSet::Item(item) => rewrite_set_item(item),
        ast::ClassSet::BinaryOp(op) => {
            rewrite_set(&mut op.lhs);
            rewrite_set(&mut op.rhs);
        }
    }
}

/// Replaces the Perl classes with their ASCII sets and `\b` with a backspace literal.
fn rewrite_escapes(ast: &mut Ast) {
    match ast {
        Ast::Class(ast::Class::Perl(perl)) => {
            *ast = Ast::Class(ast::Class::Bracketed(ascii_class(perl)));
        }
        Ast::Class(ast::Class::Bracketed(class)) => rewrite_set(&mut class.kind),
        Ast::Assertion(assertion) if assertion.kind == ast::AssertionKind::WordBoundary => {
            *ast = Ast::Literal(ast::Literal {
                span: assertion.span,
                kind: ast::LiteralKind::Verbatim,
                c: '\u{8}',
            });
        }
        Ast::Repetition(rep) => rewrite_escapes(&mut rep.ast),
        Ast::Group(group) => rewrite_escapes(&mut group.ast),
        Ast::Alternation(alt) => alt.asts.iter_mut().for_each(rewrite_escapes),
        Ast::Concat(concat) => concat.asts.iter_mut().for_each(rewrite_escapes),
        _ => {}
    }
}

fn class_ranges(class: &hir::Class) -> Vec<CharacterRange> {
    match class {
        hir::Class::Unicode(uni) => uni
            .ranges()
            .iter()
            .map(|r| CharacterRange::chars(r.start(), r.end()))
            .collect(),
        hir::Class::Bytes(bytes) => bytes
            .iter()
            .map(|r| CharacterRange::new(r.start() as u32, r.end() as u32))
            .collect(),
    }
}

fn repeated(regex: &Regex, n: u32) -> Vec<Regex> {
    (0..n).map(|_| regex.clone()).collect()
}

/// Lowers a `regex_syntax` tree while keeping count of the nodes repetitions add.
struct Lowering {
    limit: usize,
    used: usize,
}

impl Lowering {
    fn expand(&mut self, inner: &Regex, copies: u32) -> Result<(), UnsupportedFeature> {
        let added = (inner.size() + 1).saturating_mul(copies as usize);
        self.used = self.used.saturating_add(added);
        if self.used > self.limit {
            return Err(UnsupportedFeature::TooLarge { limit: self.limit });
        }
        Ok(())
    }

    fn lower_all(&mut self, items: &[Hir]) -> Result<Vec<Regex>, UnsupportedFeature> {
        items.iter().map(|hir| self.lower(hir)).collect()
    }

    fn lower(&mut self, hir: &Hir) -> Result<Regex, UnsupportedFeature> {
        let regex = match hir.kind() {
            HirKind::Empty => Regex::Empty,
            HirKind::Literal(lit) => match lit {
                hir::Literal::Unicode(c) => Regex::Char(*c),
                hir::Literal::Byte(b) => Regex::Char(*b as char),
            },
            HirKind::Class(class) => {
                let ranges = class_ranges(class);
                match ranges.as_slice() {
                    [single] if single.is_single() => {
                        match std::char::from_u32(single.from) {
                            Some(c) => Regex::Char(c),
                            None => Regex::Range(*single),
                        }
                    }
                    [single] => Regex::Range(*single),
                    _ => Regex::RangeList(ranges),
                }
            }
            HirKind::Anchor(anchor) => {
                return Err(match anchor {
                    hir::Anchor::StartLine => UnsupportedFeature::StartLine,
                    hir::Anchor::EndLine => UnsupportedFeature::EndLine,
                    hir::Anchor::StartText => UnsupportedFeature::StartText,
                    hir::Anchor::EndText => UnsupportedFeature::EndText,
                })
            }
            HirKind::WordBoundary(boundary) => {
                return Err(match boundary {
                    hir::WordBoundary::Unicode => UnsupportedFeature::WordBoundaryUnicode,
                    hir::WordBoundary::UnicodeNegate => {
                        UnsupportedFeature::WordBoundaryUnicodeNegate
                    }
                    hir::WordBoundary::Ascii => UnsupportedFeature::WordBoundaryAscii,
                    hir::WordBoundary::AsciiNegate => UnsupportedFeature::WordBoundaryAsciiNegate,
                })
            }
            // Greediness is irrelevant, only full matches are recognized.
            HirKind::Repetition(rep) => {
                let inner = self.lower(rep.hir.as_ref())?;
                match &rep.kind {
                    hir::RepetitionKind::ZeroOrOne => Regex::Optional(Box::new(inner)),
                    hir::RepetitionKind::ZeroOrMore => Regex::ZeroOrMore(Box::new(inner)),
                    hir::RepetitionKind::OneOrMore => Regex::OneOrMore(Box::new(inner)),
                    hir::RepetitionKind::Range(range) => match *range {
                        hir::RepetitionRange::Exactly(n) => {
                            self.expand(&inner, n)?;
                            Regex::Concat(repeated(&inner, n))
                        }
                        hir::RepetitionRange::AtLeast(n) => {
                            self.expand(&inner, n.saturating_add(1))?;
                            let mut items = repeated(&inner, n);
                            items.push(Regex::ZeroOrMore(Box::new(inner)));
                            Regex::Concat(items)
                        }
                        hir::RepetitionRange::Bounded(n, m) => {
                            self.expand(&inner, m.max(n))?;
                            let mut items = repeated(&inner, n);
                            let optional = Regex::Optional(Box::new(inner));
                            items.extend(repeated(&optional, m.saturating_sub(n)));
                            Regex::Concat(items)
                        }
                    },
                }
            }
            HirKind::Group(group) => self.lower(group.hir.as_ref())?,
            HirKind::Concat(items) => Regex::Concat(self.lower_all(items)?),
            HirKind::Alternation(items) => Regex::Alternation(self.lower_all(items)?),
        };
        Ok(regex)
    }
}

impl TryFrom<&Hir> for Regex {
    type Error = UnsupportedFeature;

    fn try_from(hir: &Hir) -> Result<Self, Self::Error> {
        Lowering {
            limit: DEFAULT_SIZE_LIMIT,
            used: 0,
        }
        .lower(hir)
    }
}

/// Checks if `pattern` parses and only uses features the automata can express.
pub fn is_supported(pattern: &str) -> Result<(), UnsupportedFeature> {
    Regex::parse(pattern).map(|_| ())
}
