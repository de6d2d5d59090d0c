//! Page slicing and pagination metadata.
//!
//! [`page_slice`] cuts one page out of a working dataset. [`Pager`] holds the
//! page size and the width of the page-number window and computes a
//! [`Pagination`] descriptor from a row count and an offset. The same
//! descriptor is used whether the records were sliced locally or a server
//! already returned a single page.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};

/// Returns records `[offset, offset + pagesize)`, clipped to the dataset.
///
/// An offset past the end yields an empty page.
pub fn page_slice<T>(items: &[T], offset: usize, pagesize: usize) -> &[T] {
    let start = offset.min(items.len());
    let end = offset.saturating_add(pagesize).min(items.len());
    &items[start..end]
}

/// Page size and page-number window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pagesize: NonZeroUsize,
    show_pages: NonZeroUsize,
}

impl Default for Pager {
    fn default() -> Self {
        Pager {
            pagesize: NonZeroUsize::MIN.saturating_add(9),
            show_pages: NonZeroUsize::MIN.saturating_add(4),
        }
    }
}

impl Pager {
    /// Creates a pager. Both the page size and the window must be non-zero.
    pub fn new(pagesize: usize, show_pages: usize) -> Result<Self> {
        Ok(Pager {
            pagesize: NonZeroUsize::new(pagesize).ok_or(QueryError::ZeroPageSize)?,
            show_pages: NonZeroUsize::new(show_pages).ok_or(QueryError::ZeroWindow)?,
        })
    }

    /// Records per page.
    pub fn pagesize(&self) -> usize {
        self.pagesize.get()
    }

    /// Maximum number of page numbers in the window.
    pub fn show_pages(&self) -> usize {
        self.show_pages.get()
    }

    /// Offset of the first record of a 1-based page. Page 0 reads as page 1.
    pub fn offset_of(&self, page: usize) -> usize {
        page.saturating_sub(1).saturating_mul(self.pagesize())
    }

    /// 1-based page containing the record at `offset`.
    pub fn page_of(&self, offset: usize) -> usize {
        (offset / self.pagesize()).saturating_add(1)
    }

    /// Slices one page out of a working dataset.
    pub fn slice<'a, T>(&self, items: &'a [T], offset: usize) -> &'a [T] {
        page_slice(items, offset, self.pagesize())
    }

    /// Computes the pagination descriptor.
    ///
    /// The window is biased to show up to two pages before the current one
    /// and is shifted left when it would run past the last page.
    pub fn metadata(&self, rowcount: usize, offset: usize) -> Pagination {
        let pagesize = self.pagesize();
        let show_pages = self.show_pages();
        let currpage = self.page_of(offset);
        let totalpages = rowcount.div_ceil(pagesize);

        if totalpages == 0 {
            return Pagination {
                firstrec: 0,
                lastrec: 0,
                rowcount: 0,
                currpage,
                lastpage: 0,
                pages: Vec::new(),
                totalpages: 0,
                show_pages,
                pagesize,
            };
        }

        let lead = 2.min(show_pages - 1);
        let mut firstpage = currpage.saturating_sub(lead).max(1);
        let mut lastpage = firstpage.saturating_add(show_pages - 1);
        if lastpage > totalpages {
            let overflow = lastpage - totalpages;
            lastpage = totalpages;
            firstpage = firstpage.saturating_sub(overflow).max(1);
        }

        Pagination {
            firstrec: (currpage - 1).saturating_mul(pagesize).saturating_add(1),
            lastrec: currpage.saturating_mul(pagesize).min(rowcount),
            rowcount,
            currpage,
            lastpage,
            pages: (firstpage..=lastpage).collect(),
            totalpages,
            show_pages,
            pagesize,
        }
    }
}

/// Computes pagination metadata without building a [`Pager`] first.
pub fn compute_metadata(
    rowcount: usize,
    offset: usize,
    pagesize: usize,
    show_pages: usize,
) -> Result<Pagination> {
    Ok(Pager::new(pagesize, show_pages)?.metadata(rowcount, offset))
}

/// Pagination descriptor for one page of a working dataset.
///
/// `firstrec` and `lastrec` are 1-based record positions; both are 0 when
/// there are no records. `pages` is the window of page numbers to offer and
/// `lastpage` is its last entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub firstrec: usize,
    pub lastrec: usize,
    pub rowcount: usize,
    pub currpage: usize,
    pub lastpage: usize,
    pub pages: Vec<usize>,
    pub totalpages: usize,
    pub show_pages: usize,
    pub pagesize: usize,
}

impl Pagination {
    /// Returns `true` if `page` is a page that can be navigated to.
    pub fn has_page(&self, page: usize) -> bool {
        (1..=self.totalpages).contains(&page)
    }

    /// Returns `true` if there is a page after the current one.
    pub fn has_next(&self) -> bool {
        self.currpage < self.totalpages
    }

    /// Returns `true` if there is a page before the current one.
    pub fn has_previous(&self) -> bool {
        self.currpage > 1 && self.totalpages > 0
    }
}
