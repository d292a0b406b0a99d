//! Directive grammar table
//!
//! Each directive maps to one or more [`Mask`]s. A mask combines the contexts
//! the directive may appear in, whether it opens a block, and how many
//! arguments it takes. Contexts are identified by the chain of enclosing
//! block names.

use std::fmt;
use std::ops::BitOr;

/// Bit set describing where a directive is allowed and what it takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask(u32);

impl Mask {
    // Arity
    pub const NOARGS: Mask = Mask(0x0000_0001);
    pub const TAKE1: Mask = Mask(0x0000_0002);
    pub const TAKE2: Mask = Mask(0x0000_0004);
    pub const TAKE3: Mask = Mask(0x0000_0008);
    pub const TAKE4: Mask = Mask(0x0000_0010);
    pub const TAKE5: Mask = Mask(0x0000_0020);
    pub const TAKE6: Mask = Mask(0x0000_0040);
    pub const TAKE7: Mask = Mask(0x0000_0080);
    pub const BLOCK: Mask = Mask(0x0000_0100);
    pub const FLAG: Mask = Mask(0x0000_0200);
    pub const ANY: Mask = Mask(0x0000_0400);
    pub const ONE_OR_MORE: Mask = Mask(0x0000_0800);
    pub const TWO_OR_MORE: Mask = Mask(0x0000_1000);

    pub const TAKE12: Mask = Mask::TAKE1.union(Mask::TAKE2);

    // Contexts
    pub const MAIN_CONF: Mask = Mask(0x0004_0000);
    pub const EVENT_CONF: Mask = Mask(0x0008_0000);
    pub const HTTP_MAIN_CONF: Mask = Mask(0x0200_0000);
    pub const HTTP_SRV_CONF: Mask = Mask(0x0400_0000);
    pub const HTTP_LOC_CONF: Mask = Mask(0x0800_0000);
    pub const HTTP_UPS_CONF: Mask = Mask(0x1000_0000);
    pub const HTTP_SIF_CONF: Mask = Mask(0x2000_0000);
    pub const HTTP_LIF_CONF: Mask = Mask(0x4000_0000);
    pub const HTTP_LMT_CONF: Mask = Mask(0x8000_0000);

    pub const fn union(self, other: Mask) -> Mask {
        Mask(self.0 | other.0)
    }

    /// All bits of `other` are set
    pub const fn contains(self, other: Mask) -> bool {
        self.0 & other.0 == other.0
    }

    /// At least one bit of `other` is set
    pub const fn intersects(self, other: Mask) -> bool {
        self.0 & other.0 != 0
    }

    /// Accepts exactly `n` arguments through one of NOARGS..TAKE7
    pub const fn takes(self, n: usize) -> bool {
        n <= 7 && (self.0 >> n) & 1 == 1
    }
}

impl BitOr for Mask {
    type Output = Mask;

    fn bitor(self, rhs: Mask) -> Mask {
        self.union(rhs)
    }
}

const fn all(masks: &[Mask]) -> Mask {
    let mut bits = 0;
    let mut i = 0;
    while i < masks.len() {
        bits |= masks[i].0;
        i += 1;
    }
    Mask(bits)
}

const HTTP_ANY: Mask = all(&[Mask::HTTP_MAIN_CONF, Mask::HTTP_SRV_CONF, Mask::HTTP_LOC_CONF]);

static CONTEXTS: &[(&[&str], Mask)] = &[
    (&[], Mask::MAIN_CONF),
    (&["events"], Mask::EVENT_CONF),
    (&["http"], Mask::HTTP_MAIN_CONF),
    (&["http", "server"], Mask::HTTP_SRV_CONF),
    (&["http", "location"], Mask::HTTP_LOC_CONF),
    (&["http", "upstream"], Mask::HTTP_UPS_CONF),
    (&["http", "server", "if"], Mask::HTTP_SIF_CONF),
    (&["http", "location", "if"], Mask::HTTP_LIF_CONF),
    (&["http", "location", "limit_except"], Mask::HTTP_LMT_CONF),
];

static DIRECTIVES: &[(&str, &[Mask])] = &[
    ("events", &[all(&[Mask::MAIN_CONF, Mask::BLOCK, Mask::NOARGS])]),
    ("http", &[all(&[Mask::MAIN_CONF, Mask::BLOCK, Mask::NOARGS])]),
    (
        "server",
        &[
            all(&[Mask::HTTP_MAIN_CONF, Mask::BLOCK, Mask::NOARGS]),
            all(&[Mask::HTTP_UPS_CONF, Mask::ONE_OR_MORE]),
        ],
    ),
    ("location", &[all(&[HTTP_ANY, Mask::ONE_OR_MORE, Mask::BLOCK])]),
    ("upstream", &[all(&[Mask::HTTP_MAIN_CONF, Mask::TAKE1, Mask::BLOCK])]),
    ("include", &[all(&[Mask::MAIN_CONF, HTTP_ANY, Mask::TAKE1])]),
    ("listen", &[all(&[Mask::HTTP_SRV_CONF, Mask::ONE_OR_MORE])]),
    ("server_name", &[all(&[Mask::HTTP_SRV_CONF, Mask::ONE_OR_MORE])]),
    ("root", &[all(&[HTTP_ANY, Mask::TAKE1])]),
    ("index", &[all(&[HTTP_ANY, Mask::ONE_OR_MORE])]),
    ("error_page", &[all(&[HTTP_ANY, Mask::TWO_OR_MORE])]),
    ("access_log", &[all(&[HTTP_ANY, Mask::ONE_OR_MORE])]),
    ("error_log", &[all(&[Mask::MAIN_CONF, HTTP_ANY, Mask::ONE_OR_MORE])]),
    ("worker_processes", &[all(&[Mask::MAIN_CONF, Mask::TAKE1])]),
    ("worker_connections", &[all(&[Mask::EVENT_CONF, Mask::TAKE1])]),
    ("keepalive_timeout", &[all(&[HTTP_ANY, Mask::TAKE12])]),
    ("gzip", &[all(&[HTTP_ANY, Mask::FLAG])]),
    (
        "return",
        &[all(&[
            Mask::HTTP_SRV_CONF,
            Mask::HTTP_SIF_CONF,
            Mask::HTTP_LOC_CONF,
            Mask::HTTP_LIF_CONF,
            Mask::TAKE12,
        ])],
    ),
    ("try_files", &[all(&[Mask::HTTP_LOC_CONF, Mask::TWO_OR_MORE])]),
    ("proxy_pass", &[all(&[Mask::HTTP_LOC_CONF, Mask::TAKE1])]),
    ("if", &[all(&[Mask::HTTP_SRV_CONF, Mask::HTTP_LOC_CONF, Mask::ONE_OR_MORE, Mask::BLOCK])]),
];

/// Masks declared for a directive, in declaration order
pub fn directive_masks(directive: &str) -> Option<&'static [Mask]> {
    DIRECTIVES
        .iter()
        .find(|(name, _)| *name == directive)
        .map(|(_, masks)| *masks)
}

/// Chain of enclosing block names, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Context(Vec<String>);

impl Context {
    /// The top level of a file
    pub fn main() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn is(&self, names: &[&str]) -> bool {
        self.0.len() == names.len() && self.0.iter().zip(names).all(|(a, b)| a == b)
    }

    /// Context mask, if this context is part of the grammar
    pub fn mask(&self) -> Option<Mask> {
        CONTEXTS
            .iter()
            .find(|(names, _)| self.is(names))
            .map(|(_, mask)| *mask)
    }

    /// Context inside a block opened by `directive`
    ///
    /// A `location` anywhere under `http` is always `http > location`, so
    /// nested locations do not deepen the context.
    pub fn enter(&self, directive: &str) -> Context {
        if directive == "location" && self.0.first().is_some_and(|name| name == "http") {
            return Context::from_names(["http", "location"]);
        }
        let mut names = self.0.clone();
        names.push(directive.to_string());
        Context(names)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "main")
        } else {
            write!(f, "{}", self.0.join(" > "))
        }
    }
}
