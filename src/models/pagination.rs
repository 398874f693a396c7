/// Largest offset SQLite accepts.
const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// A resolved page request: 1-based page number and a page size that has
/// already been clamped to the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    #[must_use]
    pub fn resolve(page: Option<u64>, limit: Option<u64>, default_size: u64, max_size: u64) -> Self {
        let size = limit
            .filter(|l| *l > 0)
            .unwrap_or(default_size)
            .min(max_size)
            .max(1);
        // Keep `page * size` within a SQL offset; anything beyond is past the end anyway.
        let max_page = MAX_OFFSET / size + 1;
        Self {
            page: page.unwrap_or(1).clamp(1, max_page),
            size,
        }
    }

    /// Offset of the first item on this page, `None` on overflow.
    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.index().checked_mul(self.size)
    }

    /// Zero-based page index as the paginator expects it.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.page - 1
    }

    /// Whether this page lies beyond the last one for `total` items.
    /// The first page always exists, even for an empty result.
    #[must_use]
    pub const fn is_out_of_range(&self, total: u64) -> bool {
        if self.page <= 1 {
            return false;
        }
        match self.offset() {
            Some(offset) => offset >= total,
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Paged<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}
