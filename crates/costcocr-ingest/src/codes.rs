//! # Receipt Code Book
//!
//! Receipts print truncated codes ("KS SALMON"), and OCR mangles them
//! further ("KS SALMN"). The code book maps them back to readable names.
//!
//! ## Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lookup("ks salmn")                                                     │
//! │       │                                                                 │
//! │       ├── normalize: trim + uppercase → "KS SALMN"                      │
//! │       │                                                                 │
//! │       ├── exact code match?  → name                                     │
//! │       │                                                                 │
//! │       ├── best similarity = 1 - levenshtein / max_len                   │
//! │       │     "KS SALMON" → 0.89   "KS SEAWEED" → 0.50   ...              │
//! │       │                                                                 │
//! │       └── best >= cutoff (0.6)? → "Kirkland Salmon Slices"              │
//! │           otherwise           → None                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ties go to the entry listed first.

/// Similarity a code must reach to count as a match.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Known Costco receipt codes and the items they stand for.
pub const COSTCO_CODES: &[(&str, &str)] = &[
    ("MAR BSBSMOKE", "Barbecue Smoked Chicken Breast"),
    ("KS SEAWEED", "Kirkland Seaweed"),
    ("NAAN BREAD", "Naan Bread"),
    ("HABANERO SSG", "Habanero Sausage"),
    ("AID CHKN SSG", "Chicken Sausage"),
    ("PEPHOTPOCKET", "Hot Pockets"),
    ("FOOD WRAP", "Cling Wrap"),
    ("MORNING BUN", "Morning bun"),
    ("SABRA GR/CLA", "Sabra Classic/Garlic Hummus"),
    ("ORG. CARROTS", "Organic Carrots"),
    ("STIR FRY VEG", "Stir Fry Vegetables"),
    ("YAKISOBA", "Yakisoba"),
    ("HERB TURKEY", "Herb Turkey Breast Slices"),
    ("KS SALMON", "Kirkland Salmon Slices"),
    ("FUJI APPLES", "Fuji Apples"),
    ("SALMON BURGER", "Salmon Burger Patties"),
    ("KS TUNA", "Kirkland Canned Tuna"),
    ("FIBER ONE", "Fiber One Granola Bar"),
    ("RAISIN BRAN", "Raisin Bran Cereal"),
    ("CHKN POTSTIK", "Chicken Potstickers"),
    ("PENNE PASTA", "Penne Pasta"),
    ("BLUE BISCUIT", "Belvita Blueberry Biscuits"),
    ("ZIPLOC SANDW", "Ziplock Sandwich Bags"),
    ("QUAKER OATS", "Quaker Oatmeal"),
    ("ORGCHIX/PROV", "Organic Chicken Provalone Sausages"),
    ("POWERC 2x150", "Power Vitamin C"),
    ("CASHEWS 2.5#", "Cashews"),
    ("CHOC CHUNK", "Chocolate Chunk Cookies"),
    ("FRZ GAL ZIPR", "Ziplock Gallon Freezer Bags"),
];

/// A resolved code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeMatch<'a> {
    pub code: &'a str,
    pub name: &'a str,
    /// 1.0 for an exact match.
    pub score: f64,
}

/// A fixed code → name table with approximate lookup.
#[derive(Debug, Clone)]
pub struct CodeBook {
    /// (normalized code, code as given, name)
    entries: Vec<(String, String, String)>,
    cutoff: f64,
}

impl CodeBook {
    /// Builds a code book from `(code, name)` pairs.
    pub fn new<C, N>(entries: impl IntoIterator<Item = (C, N)>) -> Self
    where
        C: Into<String>,
        N: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(code, name)| {
                let code = code.into();
                (normalize(&code), code, name.into())
            })
            .collect();

        CodeBook {
            entries,
            cutoff: DEFAULT_CUTOFF,
        }
    }

    /// The built-in Costco table.
    pub fn costco() -> Self {
        CodeBook::new(COSTCO_CODES.iter().copied())
    }

    /// Sets the minimum similarity for a fuzzy match.
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a code to its canonical name.
    ///
    /// ## Example
    /// ```rust
    /// use costcocr_ingest::codes::CodeBook;
    ///
    /// let codes = CodeBook::costco();
    /// assert_eq!(codes.lookup("KS SALMN"), Some("Kirkland Salmon Slices"));
    /// assert_eq!(codes.lookup("GASOLINE"), None);
    /// ```
    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.best_match(code).map(|m| m.name)
    }

    /// Like [`lookup`](Self::lookup), but also reports the matched code and score.
    pub fn best_match(&self, code: &str) -> Option<CodeMatch<'_>> {
        let wanted = normalize(code);
        if wanted.is_empty() {
            return None;
        }

        if let Some((_, code, name)) = self.entries.iter().find(|(key, _, _)| *key == wanted) {
            return Some(CodeMatch {
                code,
                name,
                score: 1.0,
            });
        }

        let mut best: Option<CodeMatch<'_>> = None;
        for (key, code, name) in &self.entries {
            let score = similarity(&wanted, key);
            if best.map_or(true, |b| score > b.score) {
                best = Some(CodeMatch { code, name, score });
            }
        }

        best.filter(|m| m.score >= self.cutoff)
    }
}

impl Default for CodeBook {
    fn default() -> Self {
        CodeBook::costco()
    }
}

fn normalize(code: &str) -> String {
    code.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Normalized edit similarity in `0.0..=1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    // Single-row dynamic programming.
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[b.len()]
}
