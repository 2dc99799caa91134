//! Page-number pagination over an ordered listing.
//!
//! A [`Page`] is computed from the full ordered listing and the requested
//! [`Arguments`]. Walking pages `1..=pages` with a fixed size visits every item
//! of the listing exactly once, in the listing order.

use std::num::NonZeroUsize;

/// Arguments selecting a [`Page`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// 1-based number of the requested [`Page`].
    page: NonZeroUsize,

    /// Maximum number of items on the requested [`Page`].
    size: NonZeroUsize,
}

impl Arguments {
    /// Creates new [`Arguments`] if both `page` and `size` are positive.
    #[must_use]
    pub fn new(page: usize, size: usize) -> Option<Self> {
        Some(Self {
            page: NonZeroUsize::new(page)?,
            size: NonZeroUsize::new(size)?,
        })
    }

    /// Returns the 1-based number of the requested [`Page`].
    #[must_use]
    pub fn page(&self) -> usize {
        self.page.get()
    }

    /// Returns the size of the requested [`Page`].
    #[must_use]
    pub fn size(&self) -> usize {
        self.size.get()
    }

    /// Returns the index of the first item on the requested [`Page`].
    ///
    /// Saturates instead of overflowing, so absurdly large page numbers simply
    /// point past the end of any listing.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page() - 1).saturating_mul(self.size())
    }
}

/// One bounded slice of an ordered listing with its position metadata.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Page<T> {
    /// Items on this [`Page`], in listing order.
    pub items: Vec<T>,

    /// Total number of items in the whole listing.
    pub total: usize,

    /// 1-based number of this [`Page`].
    pub page: usize,

    /// Requested size of this [`Page`].
    ///
    /// May be larger than the number of [`Page::items`] on the last page.
    pub size: usize,

    /// Total number of pages of this size in the whole listing.
    pub pages: usize,
}

impl<T> Page<T> {
    /// Cuts the [`Page`] selected by the provided [`Arguments`] out of the
    /// `all` items.
    ///
    /// A page past the last one is not an error: it has no items but still
    /// reports the listing metadata.
    #[must_use]
    pub fn new(all: impl IntoIterator<Item = T>, args: Arguments) -> Self {
        let all = all.into_iter().collect::<Vec<_>>();
        let total = all.len();

        let items = all
            .into_iter()
            .skip(args.offset())
            .take(args.size())
            .collect();

        Self {
            items,
            total,
            page: args.page(),
            size: args.size(),
            pages: pages_count(total, args.size),
        }
    }

    /// Converts the items of this [`Page`] keeping its metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        let Self {
            items,
            total,
            page,
            size,
            pages,
        } = self;

        Page {
            items: items.into_iter().map(f).collect(),
            total,
            page,
            size,
            pages,
        }
    }
}

/// Returns the number of pages of the given `size` needed for `total` items.
#[must_use]
pub fn pages_count(total: usize, size: NonZeroUsize) -> usize {
    total.div_ceil(size.get())
}
