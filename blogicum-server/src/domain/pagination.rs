//! Fixed-size paging over ordered collections.
//!
//! A requested page never fails: anything that is not a usable number lands
//! on the first page, numbers below one clamp to the first page and numbers
//! past the end clamp to the last page. An empty collection has a single
//! empty page.

pub(crate) const DEFAULT_PAGE_SIZE: u32 = 10;

/// Page number as it came from the query string, before it is resolved
/// against a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RequestedPage {
    #[default]
    First,
    Number(i64),
    Last,
}

impl RequestedPage {
    pub(crate) fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::First;
        };
        if let Ok(number) = raw.parse::<i64>() {
            return Self::Number(number);
        }

        // digit runs too long for i64 are still integers, just out of range
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if !digits.is_empty() && digits.chars().all(|ch| ch.is_ascii_digit()) {
            return if negative { Self::First } else { Self::Last };
        }
        Self::First
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    number: u32,
    num_pages: u32,
    page_size: u32,
    total: u64,
}

impl PageWindow {
    pub(crate) fn resolve(requested: RequestedPage, total: u64, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let num_pages = u32::try_from(total.div_ceil(u64::from(page_size)))
            .unwrap_or(u32::MAX)
            .max(1);
        let number = match requested {
            RequestedPage::First => 1,
            RequestedPage::Last => num_pages,
            RequestedPage::Number(n) if n < 1 => 1,
            RequestedPage::Number(n) => u32::try_from(n).unwrap_or(u32::MAX).min(num_pages),
        };
        Self {
            number,
            num_pages,
            page_size,
            total,
        }
    }

    pub(crate) fn number(&self) -> u32 {
        self.number
    }

    pub(crate) fn num_pages(&self) -> u32 {
        self.num_pages
    }

    pub(crate) fn page_size(&self) -> u32 {
        self.page_size
    }

    pub(crate) fn total(&self) -> u64 {
        self.total
    }

    pub(crate) fn offset(&self) -> u64 {
        u64::from(self.number - 1) * u64::from(self.page_size)
    }

    pub(crate) fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    pub(crate) fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub(crate) fn has_previous(&self) -> bool {
        self.number > 1
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) window: PageWindow,
}

impl<T> Page<T> {
    pub(crate) fn number(&self) -> u32 {
        self.window.number()
    }

    pub(crate) fn num_pages(&self) -> u32 {
        self.window.num_pages()
    }

    pub(crate) fn has_next(&self) -> bool {
        self.window.has_next()
    }

    pub(crate) fn has_previous(&self) -> bool {
        self.window.has_previous()
    }

    pub(crate) fn next_page_number(&self) -> Option<u32> {
        self.has_next().then(|| self.number() + 1)
    }

    pub(crate) fn previous_page_number(&self) -> Option<u32> {
        self.has_previous().then(|| self.number() - 1)
    }
}

/// Slices an already ordered collection into the requested page.
pub(crate) fn paginate<T>(items: Vec<T>, requested: RequestedPage, page_size: u32) -> Page<T> {
    let window = PageWindow::resolve(requested, items.len() as u64, page_size);
    let offset = usize::try_from(window.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(window.limit()).unwrap_or(usize::MAX);
    let items = items.into_iter().skip(offset).take(limit).collect();
    Page { items, window }
}
