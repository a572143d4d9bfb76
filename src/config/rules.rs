//! Rule data model: the parsed, order-preserving form of a `.stowconfig`.

/// Which section of a config file an entry was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The implicit, header-less leading part listing exclusion patterns.
    Ignore,
    /// Everything after the `[redirect]` header.
    Redirect,
}

/// An ignore or un-ignore pattern line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreEntry {
    /// The pattern with any `!!` prefix already stripped.
    pub pattern: String,
    /// `true` for an un-ignore (`!!pattern`) that reverses a prior ignore.
    pub negate: bool,
    /// 1-based line the entry appeared on.
    pub origin_line: u32,
}

/// A `source ::: destination` redirect line.
///
/// The destination pattern is always interpreted as a directory; files keep
/// their source name under each resolved destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectEntry {
    /// Pattern matched against source paths, relative to the config's
    /// directory.
    pub source_pattern: String,
    /// Destination directory pattern, relative to the target root (or
    /// absolute), possibly containing glob segments.
    pub dest_pattern: String,
    /// 1-based line the entry appeared on.
    pub origin_line: u32,
}

/// The predicate guarding a conditional block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `[if-pkg:::…]` — holds iff every subject resolves to an executable.
    PkgPresent,
    /// `[if-not-pkg:::…]` — holds iff every subject is absent.
    PkgAbsent,
    /// `[if-profile:::…]` — holds iff the active profile is a subject.
    ProfileIs,
    /// `[if-not-profile:::…]` — holds iff the active profile is not a subject.
    ProfileIsNot,
}

/// An entry inside a conditional block body.
///
/// Body lines are parsed with the same grammar as the section the block
/// textually appears in, so a block in the ignore section holds ignore
/// entries and a block in the redirect section holds redirect entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyEntry {
    /// An ignore/un-ignore line.
    Ignore(IgnoreEntry),
    /// A redirect line.
    Redirect(RedirectEntry),
}

/// A guarded group of entries, active only when its predicate holds for the
/// current run.
///
/// Blocks are stored as data and filtered at resolution time: predicates
/// depend on runtime context (installed packages, active profile), so the
/// parser never evaluates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalBlock {
    /// Which predicate guards the block.
    pub kind: BlockKind,
    /// Whitespace-separated subjects after the `:::` delimiter.
    pub subjects: Vec<String>,
    /// The block's body entries, in source order.
    pub body: Vec<BodyEntry>,
    /// Section the block textually appears in.
    pub section: Section,
    /// 1-based line of the block header.
    pub origin_line: u32,
}

/// One top-level entry of a rule set, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEntry {
    /// A bare ignore/un-ignore line.
    Ignore(IgnoreEntry),
    /// A bare redirect line.
    Redirect(RedirectEntry),
    /// A conditional block.
    Block(ConditionalBlock),
}

/// The parsed, order-preserving rule program of one `.stowconfig`.
///
/// Entry order is never rearranged: both ignore and redirect resolution scan
/// entries in file order and let the last match win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// All entries in strict source-line order.
    pub entries: Vec<RuleEntry>,
}

impl RuleSet {
    /// `true` if the file contained no effective rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of top-level entries (blocks count as one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
