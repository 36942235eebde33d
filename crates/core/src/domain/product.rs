use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Purchase,
    Refi,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Purchase => "purchase",
            Section::Refi => "refi",
        }
    }
}

/// The tracked products, in the order they appear in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductKey {
    Fixed30,
    Fixed15,
    Fha30,
    CashOut,
    NoPoint,
}

/// Display fields used to seed a product the prior snapshot does not have yet.
#[derive(Debug, Clone, Copy)]
pub struct ProductProfile {
    pub label: &'static str,
    pub tag: &'static str,
    pub tag_class: &'static str,
    pub sub: &'static str,
    pub term: u32,
    pub featured: Option<bool>,
}

impl ProductKey {
    pub const ALL: [ProductKey; 5] = [
        ProductKey::Fixed30,
        ProductKey::Fixed15,
        ProductKey::Fha30,
        ProductKey::CashOut,
        ProductKey::NoPoint,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductKey::Fixed30 => "30yr",
            ProductKey::Fixed15 => "15yr",
            ProductKey::Fha30 => "fha",
            ProductKey::CashOut => "cashout",
            ProductKey::NoPoint => "nopoint",
        }
    }

    /// Fixed slot of this product: its section and index within that section.
    pub fn slot(self) -> (Section, usize) {
        match self {
            ProductKey::Fixed30 => (Section::Purchase, 0),
            ProductKey::Fixed15 => (Section::Purchase, 1),
            ProductKey::Fha30 => (Section::Purchase, 2),
            ProductKey::CashOut => (Section::Refi, 0),
            ProductKey::NoPoint => (Section::Refi, 1),
        }
    }

    fn env_suffix(self) -> &'static str {
        match self {
            ProductKey::Fixed30 => "30YR",
            ProductKey::Fixed15 => "15YR",
            ProductKey::Fha30 => "FHA",
            ProductKey::CashOut => "CASHOUT",
            ProductKey::NoPoint => "NOPOINT",
        }
    }

    pub fn rate_var(self) -> String {
        format!("RATE_{}", self.env_suffix())
    }

    pub fn apr_var(self) -> String {
        format!("APR_{}", self.env_suffix())
    }

    pub fn prev_rate_var(self) -> String {
        format!("PREV_RATE_{}", self.env_suffix())
    }

    pub fn profile(self) -> ProductProfile {
        match self {
            ProductKey::Fixed30 => ProductProfile {
                label: "30-Yr Fixed",
                tag: "Conventional",
                tag_class: "bg-blue-100 text-blue-700",
                sub: "0 Points",
                term: 30,
                featured: None,
            },
            ProductKey::Fixed15 => ProductProfile {
                label: "15-Yr Fixed",
                tag: "Aggressive",
                tag_class: "bg-purple-100 text-purple-700",
                sub: "Pay off faster",
                term: 15,
                featured: None,
            },
            ProductKey::Fha30 => ProductProfile {
                label: "30-Yr FHA",
                tag: "Govt.",
                tag_class: "bg-green-100 text-green-700",
                sub: "Low Down Pmt",
                term: 30,
                featured: None,
            },
            ProductKey::CashOut => ProductProfile {
                label: "Cash-Out",
                tag: "Consolidate",
                tag_class: "bg-orange-100 text-orange-700",
                sub: "Max 80% LTV",
                term: 30,
                featured: None,
            },
            ProductKey::NoPoint => ProductProfile {
                label: "No-Point Refi",
                tag: "No Lender Fees",
                tag_class: "bg-white text-green-700 border border-green-100",
                sub: "We pay title & lender fees",
                term: 30,
                featured: Some(true),
            },
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
